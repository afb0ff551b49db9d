/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

/// Iterates over the maximal alphanumeric runs of a string.
///
/// Punctuation and symbol characters never surface as tokens, they only
/// act as separators.
pub struct WordTokenizer<'x> {
    text: &'x str,
    pos: usize,
}

impl<'x> WordTokenizer<'x> {
    pub fn new(text: &'x str) -> Self {
        WordTokenizer { text, pos: 0 }
    }
}

impl<'x> Iterator for WordTokenizer<'x> {
    type Item = &'x str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        let len = bytes.len();

        while self.pos < len {
            let rest = &self.text[self.pos..];
            let mut start = None;
            let mut end = rest.len();

            for (idx, ch) in rest.char_indices() {
                if ch.is_alphanumeric() {
                    if start.is_none() {
                        start = Some(idx);
                    }
                } else if let Some(start) = start {
                    end = idx;
                    let token = &rest[start..end];
                    self.pos += idx + ch.len_utf8();
                    return Some(token);
                }
            }

            return if let Some(start) = start {
                self.pos = len;
                Some(&rest[start..end])
            } else {
                self.pos = len;
                None
            };
        }

        None
    }
}
