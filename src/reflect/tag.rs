/// A parsed binding tag.
///
/// Recognized forms: `name`, `name,inline`, `inline,name`, `,inline`, `-`.
/// The first non-empty part other than `inline` is the explicit name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    pub inline: bool,
    pub omit: bool,
}

impl<'a> Tag<'a> {
    pub fn parse(tag: &'a str) -> Self {
        if tag == "-" {
            return Self { omit: true, ..Self::default() };
        }

        let mut parsed = Self::default();
        for part in tag.split(',') {
            if part == "inline" {
                parsed.inline = true;
            } else if !part.is_empty() && parsed.name.is_empty() {
                parsed.name = part;
            }
        }
        parsed
    }

    /// The explicit name when present, otherwise `declared`.
    pub fn name_or(&self, declared: &'a str) -> &'a str {
        if self.name.is_empty() { declared } else { self.name }
    }
}
