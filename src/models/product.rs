use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Running,
    Casual,
    Formal,
    Sports,
    Boots,
    Sandals,
    Sneakers,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Running => "running",
            Category::Casual => "casual",
            Category::Formal => "formal",
            Category::Sports => "sports",
            Category::Boots => "boots",
            Category::Sandals => "sandals",
            Category::Sneakers => "sneakers",
        }
    }

    /// Maps common spoken category terms onto catalog categories before
    /// filtering ("running shoes" are filed under sneakers).
    pub fn normalize_term(term: &str) -> String {
        match term.to_lowercase().as_str() {
            "running" => "sneakers".to_string(),
            "athletic" => "sneakers".to_string(),
            "sport" => "sports".to_string(),
            "dress" => "formal".to_string(),
            "work" => "boots".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: Category,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub brand: String,
    pub gender: Gender,
}

impl Product {
    /// Sizes are matched exactly; "9" and "9.0" are different tokens.
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Case-insensitive substring match against the color set, returning the
    /// catalog color that matched. Used by the chat path; the direct cart API
    /// requires exact membership instead.
    pub fn matching_color(&self, color: &str) -> Option<&str> {
        let wanted = color.to_lowercase();
        self.colors
            .iter()
            .find(|c| c.to_lowercase().contains(&wanted))
            .map(|c| c.as_str())
    }

    pub fn has_exact_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Nike Air Max Classic".to_string(),
            description: "Iconic cushioned runner".to_string(),
            price: 129.99,
            image: "airmax.jpg".to_string(),
            category: Category::Sneakers,
            sizes: vec!["8".to_string(), "9".to_string(), "10".to_string()],
            colors: vec!["Black".to_string(), "Crimson Red".to_string()],
            stock: 5,
            brand: "Nike".to_string(),
            gender: Gender::Unisex,
        }
    }

    #[test]
    fn size_match_is_exact() {
        let p = product();
        assert!(p.has_size("9"));
        assert!(!p.has_size("9.5"));
        assert!(!p.has_size("9.0"));
    }

    #[test]
    fn color_match_is_case_insensitive_substring() {
        let p = product();
        assert_eq!(p.matching_color("black"), Some("Black"));
        assert_eq!(p.matching_color("red"), Some("Crimson Red"));
        assert_eq!(p.matching_color("green"), None);
    }

    #[test]
    fn exact_color_membership_is_case_sensitive() {
        let p = product();
        assert!(p.has_exact_color("Black"));
        assert!(!p.has_exact_color("black"));
    }

    #[test]
    fn category_synonyms_normalize() {
        assert_eq!(Category::normalize_term("Running"), "sneakers");
        assert_eq!(Category::normalize_term("dress"), "formal");
        assert_eq!(Category::normalize_term("work"), "boots");
        assert_eq!(Category::normalize_term("sandals"), "sandals");
    }
}
