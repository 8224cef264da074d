/// Token the story prompt instructs the model to emit after every page.
pub const PAGE_BREAK_MARKER: &str = "[PAGE BREAK]";

/// Every story has exactly this many pages.
pub const PAGE_COUNT: usize = 5;

// Pages shorter than this are never split further.
const SPLIT_THRESHOLD: usize = 200;

/// Normalizes raw model output into exactly [`PAGE_COUNT`] non-empty pages.
///
/// Extra segments beyond the fifth are dropped (the model tends to append
/// boilerplate after the intended pages). Too few segments are grown by
/// splitting the longest long page at its sentence midpoint, then by
/// appending synthetic continuation pages built around `display_name`.
/// Deterministic for a given input.
pub fn split_into_pages(raw: &str, display_name: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split(PAGE_BREAK_MARKER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    if pages.len() > PAGE_COUNT {
        pages.truncate(PAGE_COUNT);
    }

    while pages.len() < PAGE_COUNT && !pages.is_empty() {
        match longest_splittable_index(&pages) {
            Some(index) => {
                let halves = split_at_sentence_midpoint(&pages[index]);
                if halves.len() > 1 {
                    pages.splice(index..=index, halves);
                } else {
                    pages.push(format!("The adventure continues with {}...", display_name));
                }
            }
            None => break,
        }
    }

    while pages.len() < PAGE_COUNT {
        pages.push(format!(
            "And so {}'s amazing adventure continued...",
            display_name
        ));
    }

    pages.truncate(PAGE_COUNT);
    pages
}

fn longest_splittable_index(pages: &[String]) -> Option<usize> {
    let (index, longest) = pages
        .iter()
        .enumerate()
        .max_by_key(|(_, page)| page.chars().count())?;
    (longest.chars().count() > SPLIT_THRESHOLD).then_some(index)
}

/// Splits a page into two sentence halves. Requires at least four sentences;
/// otherwise returns the page unchanged. The first half gets its trailing
/// period back.
fn split_at_sentence_midpoint(page: &str) -> Vec<String> {
    let sentences: Vec<&str> = page.split(". ").collect();
    if sentences.len() >= 4 {
        let midpoint = sentences.len() / 2;
        let first_half = sentences[..midpoint].join(". ") + ".";
        let second_half = sentences[midpoint..].join(". ");
        vec![first_half, second_half]
    } else {
        vec![page.to_string()]
    }
}
