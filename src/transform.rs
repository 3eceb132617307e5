/// Uppercase ASCII letters in place; every other byte is left alone.
pub fn to_uppercase_inplace(buf: &mut [u8]) {
    buf.make_ascii_uppercase();
}
