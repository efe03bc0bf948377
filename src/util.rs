use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_count(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 10_000 {
        format!("{:.1}k", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

pub fn short_label(label: &str) -> &str {
    let trimmed = label.trim();
    match trimmed.char_indices().nth(28) {
        Some((offset, _)) => &trimmed[..offset],
        None => trimmed,
    }
}

pub fn stable_pair(key: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair("author_42");
        let (x2, y2) = stable_pair("author_42");
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
    }

    #[test]
    fn short_label_truncates_on_char_boundaries() {
        let long = "коллаборация-очень-длинное-имя-узла-графа";
        let short = short_label(long);
        assert!(short.chars().count() <= 28);
        assert!(long.starts_with(short));
        assert_eq!(short_label("P123"), "P123");
    }

    #[test]
    fn format_count_scales() {
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(12_500), "12.5k");
        assert_eq!(format_count(2_400_000), "2.4M");
    }
}
