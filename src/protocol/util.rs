use crate::{HdbError, HdbResult};

// --- CESU8 helpers --- //

// Consumes the cesu8 bytes, returns a String with minimal allocation.
pub(crate) fn string_from_cesu8(bytes: Vec<u8>) -> HdbResult<String> {
    String::from_utf8(bytes).or_else(|e| {
        Ok(cesu8::from_cesu8(e.as_bytes())
            .map_err(|_| HdbError::Cesu8)?
            .to_string())
    })
}

// Consumes the cesu8 bytes, returns a String or the original bytes.
pub(crate) fn try_string_from_cesu8(bytes: Vec<u8>) -> Result<String, Vec<u8>> {
    String::from_utf8(bytes).or_else(|e| {
        Ok(cesu8::from_cesu8(e.as_bytes())
            .map_err(|_| e.as_bytes())?
            .to_string())
    })
}

// cesu-8 is identical to utf-8, except for high code points
// which consume 4 bytes in utf-8 and 6 in cesu-8;
// the first byte of such a code point in utf8 has the bit pattern 11110xxx
pub(crate) fn cesu8_length(s: &str) -> usize {
    let mut len = s.len();
    for b in s.as_bytes() {
        if *b >= 240_u8 {
            len += 2;
        }
    }
    len
}

// Determines how many bytes must be cut off from the end of a cesu-8 byte
// sequence of length `len` so that the remainder ends in complete characters.
pub(crate) fn cesu8_tail_len(bytes: &[u8], len: usize) -> std::io::Result<usize> {
    if len == 0 {
        return Ok(0);
    }
    match bytes[len - 1] {
        0..=127 => Ok(0),
        0xC0..=0xDF => Ok(1),
        _ => {
            for index in (0..len).rev() {
                if let Some(char_len) = match cesu8_char_type(bytes, index, len) {
                    Cesu8CharType::One => Some(1),
                    Cesu8CharType::Two => Some(2),
                    Cesu8CharType::Three => Some(3),
                    Cesu8CharType::FirstHalfOfSurrogate => Some(6),
                    Cesu8CharType::SecondHalfOfSurrogate
                    | Cesu8CharType::NotAStart
                    | Cesu8CharType::TooShort => None,
                } {
                    return Ok(match (len - index).cmp(&char_len) {
                        std::cmp::Ordering::Greater => len - index - char_len,
                        std::cmp::Ordering::Equal => 0,
                        std::cmp::Ordering::Less => len - index,
                    });
                }
            }
            Err(io_error("no valid cesu8 cutoff point found"))
        }
    }
}

// First half of a surrogate pair:  ED A0 80  to  ED AF BF
// Second half of a surrogate pair: ED B0 80  to  ED BF BF
// Any three-byte sequence:         E0 80 80  to  EF BF BF
fn cesu8_char_type(cesu8: &[u8], first: usize, len: usize) -> Cesu8CharType {
    if first == len - 1 {
        match cesu8[first] {
            0x00..=0x7F => Cesu8CharType::One,
            0xC0..=0xDF => Cesu8CharType::Two,
            _ => Cesu8CharType::TooShort,
        }
    } else {
        match (cesu8[first], cesu8[first + 1]) {
            (0x00..=0x7F, _) => Cesu8CharType::One,
            (0xC0..=0xDF, _) => Cesu8CharType::Two,
            (0xED, 0xA0..=0xAF) => Cesu8CharType::FirstHalfOfSurrogate,
            (0xED, 0xB0..=0xBF) => Cesu8CharType::SecondHalfOfSurrogate,
            (0xE0..=0xEF, 0x80..=0xBF) => Cesu8CharType::Three,
            (_, _) => Cesu8CharType::NotAStart,
        }
    }
}

#[derive(Debug)]
enum Cesu8CharType {
    TooShort,
    NotAStart,
    One,
    Two,
    Three,
    FirstHalfOfSurrogate,
    SecondHalfOfSurrogate,
}

pub(crate) fn io_error<E>(e: E) -> std::io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    std::io::Error::new(std::io::ErrorKind::Other, e)
}

#[cfg(test)]
mod tests {
    #[test]
    fn cesu8_tail_detection() {
        let s_utf8 = "Quest💩o codice è modificabile ed eseguibile! \
            여기에서 코드를 수정하고 실행할 수 있습니다! \
            Este código é editável e execu💩💩t💩ável! \
            这段💩💩💩💩代💩💩码是可以编辑并且能够运行的！";

        let v_cesu8 = cesu8::to_cesu8(s_utf8);
        assert_eq!(s_utf8, cesu8::from_cesu8(&v_cesu8).unwrap());

        for i in 0..v_cesu8.len() {
            // forcefully split in two parts that may be invalid unicode
            let (first_cesu8, second_cesu8) = v_cesu8.split_at(i);

            let tail_len = super::cesu8_tail_len(first_cesu8, first_cesu8.len()).unwrap();
            assert!(tail_len < 6);
            let (valid, tail) = first_cesu8.split_at(first_cesu8.len() - tail_len);

            let mut f_utf8 = super::string_from_cesu8(valid.to_vec()).unwrap();
            let mut tail_cesu8 = Vec::new();
            tail_cesu8.extend_from_slice(tail);
            tail_cesu8.extend_from_slice(second_cesu8);
            f_utf8.push_str(&String::from(cesu8::from_cesu8(&tail_cesu8).unwrap()));
            assert_eq!(s_utf8, f_utf8);
        }
    }

    #[test]
    fn cesu8_length_counts_supplementary_chars() {
        assert_eq!(super::cesu8_length("abc"), 3);
        assert_eq!(super::cesu8_length("💩"), 6);
        assert_eq!(super::cesu8_length("a💩b"), 8);
    }
}
