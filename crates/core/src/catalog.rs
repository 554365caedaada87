//! Built-in exercise names offered when logging. Any other trimmed,
//! non-empty name is accepted as a custom exercise.

pub const EXERCISES: [&str; 30] = [
    "Bench Press",
    "Squat",
    "Deadlift",
    "Overhead Press",
    "Barbell Row",
    "Pull-ups",
    "Dips",
    "Incline Bench Press",
    "Romanian Deadlift",
    "Bulgarian Split Squat",
    "Lat Pulldown",
    "Leg Press",
    "Shoulder Press",
    "Bicep Curl",
    "Tricep Extension",
    "Leg Curl",
    "Leg Extension",
    "Calf Raise",
    "Face Pull",
    "Lateral Raise",
    "Chest Fly",
    "Hammer Curl",
    "Close Grip Bench Press",
    "Front Squat",
    "Sumo Deadlift",
    "T-Bar Row",
    "Shrug",
    "Hip Thrust",
    "Plank",
    "Russian Twist",
];

/// Catalogue entries containing `term`, ignoring case, in catalogue order.
/// An empty term returns everything.
#[must_use]
pub fn search(term: &str) -> Vec<&'static str> {
    let needle = term.trim().to_lowercase();
    EXERCISES
        .iter()
        .copied()
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect()
}

/// The name to log for user input: the catalogue spelling when the input
/// matches an entry ignoring case, otherwise the trimmed input. `None` when
/// nothing but whitespace was given.
#[must_use]
pub fn canonical_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let known = EXERCISES
        .iter()
        .find(|name| name.eq_ignore_ascii_case(trimmed));
    Some(known.map_or_else(|| trimmed.to_owned(), |name| (*name).to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ignores_case_and_keeps_order() {
        assert_eq!(
            search("bench"),
            ["Bench Press", "Incline Bench Press", "Close Grip Bench Press"]
        );
        assert_eq!(search("DEAD"), ["Deadlift", "Romanian Deadlift", "Sumo Deadlift"]);
        assert!(search("zumba").is_empty());
    }

    #[test]
    fn blank_search_lists_everything() {
        assert_eq!(search("").len(), EXERCISES.len());
        assert_eq!(search("   ").len(), 30);
    }

    #[test]
    fn known_names_take_catalogue_spelling() {
        assert_eq!(canonical_name("  bench press ").as_deref(), Some("Bench Press"));
        assert_eq!(canonical_name("t-bar row").as_deref(), Some("T-Bar Row"));
    }

    #[test]
    fn custom_names_are_trimmed() {
        assert_eq!(
            canonical_name("  Cable Crossover  ").as_deref(),
            Some("Cable Crossover")
        );
        assert_eq!(canonical_name(" \t "), None);
    }
}
