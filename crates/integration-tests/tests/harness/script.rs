//! Canned article and model output

const SENTENCES: &[&str] = &[
    "Photosynthesis is the process plants, algae and some bacteria use to turn light into chemical energy.",
    "It takes place mostly in the leaves, inside chloroplasts that contain the green pigment chlorophyll.",
    "Light energy splits water molecules, releasing oxygen and storing energy in carrier molecules.",
    "That stored energy then drives the Calvin cycle, which fixes carbon dioxide into sugars.",
    "Nearly all life on Earth depends on this process, directly or through the food chain.",
];

/// Plain-text extract of at least `words` words followed by a references section
pub fn article(words: usize) -> String {
    let mut paragraphs = Vec::new();
    let mut count = 0;
    while count < words {
        let paragraph = SENTENCES.join(" ");
        count += paragraph.split_whitespace().count();
        paragraphs.push(paragraph);
    }
    paragraphs.push("== References ==".to_owned());
    paragraphs.push("Smith, J. (2020). Plant Biology.".to_owned());
    paragraphs.join("\n\n")
}

/// Model reply holding `n` alternating, correctly sectioned lines
pub fn reply(n: u32) -> String {
    let lines: Vec<serde_json::Value> = (1..=n)
        .map(|index| {
            let section = match index {
                i if i <= 2 => "opening",
                i if i == n => "closing",
                i if i <= n / 2 => "core-explanation",
                i if i <= n * 3 / 4 => "elaboration",
                _ => "interactive-exchange",
            };
            serde_json::json!({
                "speaker": if index % 2 == 1 { "host" } else { "guest" },
                "section": section,
                "text": SENTENCES[(index as usize - 1) % SENTENCES.len()],
            })
        })
        .collect();
    serde_json::json!({ "lines": lines }).to_string()
}
