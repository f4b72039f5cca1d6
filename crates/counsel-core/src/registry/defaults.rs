//! The built-in advisory board used when no seed list is configured.

use counsel_types::advisor::{Advisor, AdvisorId, Personality};

fn advisor(id: &str, name: &str, description: &str, expertise: &[&str], position: u32) -> Advisor {
    Advisor {
        id: AdvisorId::from(id),
        name: name.to_string(),
        description: description.to_string(),
        personality: Personality::default(),
        expertise: expertise.iter().map(|s| s.to_string()).collect(),
        position,
    }
}

/// Warren Buffett, John Maynard Keynes, Benjamin Graham, Albert Einstein.
pub fn default_advisors() -> Vec<Advisor> {
    vec![
        advisor(
            "warren_buffett",
            "Warren Buffett",
            "The most successful investor of modern times with a 20% annualized return over 55+ years.",
            &["value investing", "business analysis", "capital allocation"],
            0,
        ),
        advisor(
            "john_keynes",
            "John Maynard Keynes",
            "Revolutionary economist who was also an exceptional practical investor.",
            &["macroeconomics", "contrarian investing", "market psychology"],
            1,
        ),
        advisor(
            "benjamin_graham",
            "Benjamin Graham",
            "The \"Father of Value Investing\" whose books created the intellectual foundation for generations of investors.",
            &["value investing", "margin of safety", "fundamental analysis"],
            2,
        ),
        advisor(
            "albert_einstein",
            "Albert Einstein",
            "Renowned physicist with analytical thinking and pattern recognition abilities.",
            &["pattern recognition", "systems thinking", "thought experiments"],
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_types::advisor::ExpertiseCategory;

    #[test]
    fn test_default_board_order_and_categories() {
        let board = default_advisors();
        let ids: Vec<&str> = board.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["warren_buffett", "john_keynes", "benjamin_graham", "albert_einstein"]
        );

        let categories: Vec<ExpertiseCategory> = board.iter().map(|a| a.category()).collect();
        assert_eq!(
            categories,
            vec![
                ExpertiseCategory::ValueInvesting,
                ExpertiseCategory::Macroeconomics,
                ExpertiseCategory::ValueInvesting,
                ExpertiseCategory::PatternRecognition,
            ]
        );

        for (i, advisor) in board.iter().enumerate() {
            assert_eq!(advisor.position as usize, i);
        }
    }
}
