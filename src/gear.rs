use crate::{GearItem, Prompt, StravaClient, StravaError};

/// Picks from `items` by 1-based ordinal, falling back to the first item when
/// the answer is blank, out of range or not a number.
///
/// Returns `None` only when `items` is empty.
pub fn pick_gear<'a>(items: &'a [GearItem], answer: &str) -> Option<&'a GearItem> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|ordinal| ordinal.checked_sub(1))
        .and_then(|index| items.get(index))
        .or_else(|| items.first())
}

pub fn describe_gear(item: &GearItem) -> String {
    format!(
        "{} (ID: {}, Total Miles: {})",
        item.name, item.id, item.converted_distance
    )
}

/// Lists the athlete's shoes and asks which one to assign.
pub async fn select_gear<P>(client: &StravaClient, prompt: &mut P) -> Result<String, StravaError>
where
    P: Prompt + ?Sized,
{
    println!("\nFetching registered gear (Running Shoes)...");
    let athlete = client.get_athlete().await?;
    choose_gear(&athlete.shoes, prompt).map(|item| item.id.clone())
}

pub fn choose_gear<'a, P>(
    items: &'a [GearItem],
    prompt: &mut P,
) -> Result<&'a GearItem, StravaError>
where
    P: Prompt + ?Sized,
{
    if items.is_empty() {
        eprintln!("\nNo registered running shoes found.");
        return Err(StravaError::NoGearAvailable);
    }

    println!("\nRegistered Running Shoes:");
    for (index, item) in items.iter().enumerate() {
        println!("{}. {}", index + 1, describe_gear(item));
    }

    let answer = prompt.ask("\nSelect running shoes by number (default is 1): ")?;
    let selected = pick_gear(items, &answer).ok_or(StravaError::NoGearAvailable)?;
    println!("\nSelected Running Shoes: {}", describe_gear(selected));
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::LinePrompt;

    fn shoes() -> Vec<GearItem> {
        ["Pegasus", "Vaporfly", "Trail"]
            .iter()
            .enumerate()
            .map(|(index, name)| GearItem {
                id: format!("g{}", index + 1),
                name: name.to_string(),
                converted_distance: 100.0 * index as f64,
            })
            .collect()
    }

    #[test]
    fn picks_by_one_based_ordinal() {
        let items = shoes();
        assert_eq!(pick_gear(&items, "2").unwrap().id, "g2");
        assert_eq!(pick_gear(&items, " 3 ").unwrap().id, "g3");
    }

    #[test]
    fn lenient_default_is_first_item() {
        let items = shoes();
        for answer in ["", "0", "4", "-1", "two", "1.5"] {
            assert_eq!(pick_gear(&items, answer).unwrap().id, "g1", "answer {answer:?}");
        }
    }

    #[test]
    fn nothing_to_pick_from_empty_list() {
        assert!(pick_gear(&[], "1").is_none());
    }

    #[test]
    fn choose_gear_fails_without_gear() {
        let mut prompt = LinePrompt::new(Cursor::new("1\n"), Vec::new());
        let result = choose_gear(&[], &mut prompt);
        assert!(matches!(result, Err(StravaError::NoGearAvailable)));
        assert!(prompt.into_output().is_empty());
    }

    #[test]
    fn choose_gear_uses_prompt_answer() {
        let items = shoes();
        let mut prompt = LinePrompt::new(Cursor::new("3\n"), Vec::new());
        assert_eq!(choose_gear(&items, &mut prompt).unwrap().name, "Trail");
    }
}
