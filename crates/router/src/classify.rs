use {once_cell::sync::Lazy, regex::Regex, serde::{Deserialize, Serialize}};

/// Handler categories, in priority order. `General` is the fallback and
/// never matched by pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Healthcare,
    Legal,
    Trading,
    Security,
    SysAdmin,
    WebDev,
    Seo,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthcare => "healthcare",
            Self::Legal => "legal",
            Self::Trading => "trading",
            Self::Security => "security",
            Self::SysAdmin => "sys_admin",
            Self::WebDev => "web_dev",
            Self::Seo => "seo",
            Self::General => "general",
        }
    }
}

/// Keyword table, evaluated top to bottom. First match wins, so the order
/// here must not be rearranged: "legal advice about my medical practice"
/// is healthcare, not legal, because healthcare sits higher.
static RULES: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    [
        (Category::Healthcare, r"\b(health|medical|doctor|medicine)\b"),
        (Category::Legal, r"\b(legal|law|contract|attorney)\b"),
        (Category::Trading, r"\b(stock|crypto|trading|investment)\b"),
        (Category::Security, r"\b(security|hack|vulnerability|pentest)\b"),
        (Category::SysAdmin, r"\b(server|linux|admin|system)\b"),
        (Category::WebDev, r"\b(web|html|css|javascript|react)\b"),
        (Category::Seo, r"\b(seo|search|ranking|optimization)\b"),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        #[allow(clippy::unwrap_used)] // patterns are compile-time literals
        (category, Regex::new(&format!("(?i){pattern}")).unwrap())
    })
    .collect()
});

/// Map message text to the first matching handler category.
pub fn classify(text: &str) -> Category {
    for (category, pattern) in RULES.iter() {
        if pattern.is_match(text) {
            return *category;
        }
    }
    Category::General
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("I need to see a doctor", Category::Healthcare)]
    #[case("help with a legal contract", Category::Legal)]
    #[case("should I buy this stock?", Category::Trading)]
    #[case("found a vulnerability in the portal", Category::Security)]
    #[case("my linux box won't boot", Category::SysAdmin)]
    #[case("centering a div with css", Category::WebDev)]
    #[case("improve my page ranking", Category::Seo)]
    #[case("what's for dinner", Category::General)]
    fn single_keyword_routes_to_category(#[case] text: &str, #[case] expected: Category) {
        assert_eq!(classify(text), expected);
    }

    #[test]
    fn earlier_category_wins_on_dual_match() {
        // Matches both the healthcare and legal patterns; healthcare is
        // earlier in the table and must win.
        let text = "I need legal advice about a medical malpractice claim";
        assert_eq!(classify(text), Category::Healthcare);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("ATTORNEY NEEDED"), Category::Legal);
    }

    #[test]
    fn keywords_require_word_boundaries() {
        // "lawn" must not trip the legal "law" keyword.
        assert_eq!(classify("mowing the lawn"), Category::General);
    }

    #[test]
    fn empty_text_is_general() {
        assert_eq!(classify(""), Category::General);
    }
}
