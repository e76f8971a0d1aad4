//! Recovery of ZIP entry names written in a legacy Chinese codepage.
//!
//! Archivers on Chinese-locale Windows store entry names in GBK without
//! setting the UTF-8 flag. Readers then decode those bytes as IBM code page
//! 437, producing mojibake. CP437 maps every byte to exactly one character,
//! so re-encoding the mangled name yields the stored bytes unchanged; the
//! ZIP reader exposes those bytes directly and they are decoded as GBK here.

use std::borrow::Cow;

use encoding_rs::GBK;

/// Returns the best name for a ZIP entry.
///
/// `raw` is the name as stored in the archive and `decoded` is the reader's
/// interpretation of it. The decoded name is kept when it is plain ASCII or
/// was already read as UTF-8. Otherwise `raw` is decoded strictly as GBK and
/// the result replaces the decoded name. Bytes that are not valid GBK leave
/// the decoded name untouched; this function never fails.
///
/// # Examples
///
/// ```
/// use unnest_core::formats::legacy::recover_entry_name;
///
/// // "中文.txt" stored as GBK, shown by a CP437 reader as "ÖÐÎÄ.txt"
/// let raw = b"\xd6\xd0\xce\xc4.txt";
/// assert_eq!(recover_entry_name(raw, "ÖÐÎÄ.txt"), "中文.txt");
///
/// // Not valid GBK: the reader's name is kept
/// assert_eq!(recover_entry_name(b"\xff.txt", "\u{a0}.txt"), "\u{a0}.txt");
/// ```
#[must_use]
pub fn recover_entry_name<'a>(raw: &[u8], decoded: &'a str) -> Cow<'a, str> {
    if raw.is_ascii() || std::str::from_utf8(raw).is_ok_and(|utf8| utf8 == decoded) {
        return Cow::Borrowed(decoded);
    }

    GBK.decode_without_bom_handling_and_without_replacement(raw)
        .map_or(Cow::Borrowed(decoded), |name| Cow::Owned(name.into_owned()))
}
