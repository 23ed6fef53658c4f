const RU: &str = "АаБбВвГгДдЕеЁёЖжЗзИиЙйКкЛлМмНнОоПпРрСсТтУуФфХхЦцЧчШшЩщЪъЫыЬьЭэЮюЯя";
const EN: &[&str] = &[
    "A", "a", "B", "b", "V", "v", "G", "g", "D", "d", "E", "e", "E", "e", "ZH", "zh", "Z", "z",
    "I", "i", "J", "j", "K", "k", "L", "l", "M", "m", "N", "n", "O", "o", "P", "p", "R", "r", "S",
    "s", "T", "t", "U", "u", "F", "f", "H", "h", "TS", "ts", "CH", "ch", "SH", "sh", "SCH", "sch",
    "", "", "Y", "y", "", "", "E", "e", "YU", "yu", "YA", "ya",
];

fn translit(input: &str) -> String {
    let table: Vec<char> = RU.chars().collect();
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match table.iter().position(|&c| c == ch) {
            Some(idx) => out.push_str(EN[idx]),
            None => out.push(ch),
        }
    }
    out
}

/// Turn a display name into a URL-safe identifier: whitespace runs become a
/// single hyphen, Cyrillic is transliterated, everything outside
/// `[0-9a-z_-]` is dropped and repeated hyphens are collapsed.
pub fn generate_slug(name: &str) -> String {
    let hyphenated: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let ascii = translit(&hyphenated);

    let mut slug = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        }
    }

    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::generate_slug;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(generate_slug("Standing Desk Pro"), "standing-desk-pro");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(generate_slug("Monitor Arm (27\")"), "monitor-arm-27");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(generate_slug("Desk   Culture  Set"), "desk-culture-set");
    }

    #[test]
    fn transliterates_cyrillic() {
        assert_eq!(generate_slug("Стол для работы"), "stol-dlya-raboty");
    }

    #[test]
    fn deterministic() {
        assert_eq!(generate_slug("Ferris & Co."), generate_slug("Ferris & Co."));
    }
}
