// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalizer properties over varied input

use pulse_scraper::content::normalize;

const SAMPLES: &[&str] = &[
    "",
    "   \n\t  ",
    "A single line of text that is long enough to survive.",
    "Title of the story\n\n\n\nBody   text\twith   odd   spacing and tabs.\n\n\n",
    "First paragraph of the article body goes here.\n42\n|\nSecond paragraph continues the story.\nShare this article\nCopyright 2024 Example Media. All rights reserved.",
    "Line one is fine.\r\nLine two is fine too.\r\n\r\n\r\nLine three after a gap.",
    "We use cookies to personalise content.\nReal content line with several words.",
    "  leading and trailing spaces on each line  \n  second line with spaces  ",
];

#[test]
fn test_normalize_is_idempotent() {
    for sample in SAMPLES {
        let once = normalize(sample);
        if let Some(once) = once {
            assert_eq!(
                normalize(&once).as_deref(),
                Some(once.as_str()),
                "not idempotent for {:?}",
                sample
            );
        }
    }
}

#[test]
fn test_normalize_empty_is_none() {
    assert_eq!(normalize(""), None);
    assert_eq!(normalize(" \n \n "), None);
    assert_eq!(normalize("42\n|\n---"), None);
}

#[test]
fn test_normalize_limits_blank_lines() {
    let out = normalize("Opening line of the story.\n\n\n\n\nClosing line of the story.").unwrap();
    assert_eq!(out, "Opening line of the story.\n\nClosing line of the story.");
}

#[test]
fn test_normalize_strips_boilerplate() {
    let out = normalize(SAMPLES[4]).unwrap();
    assert!(out.contains("First paragraph"));
    assert!(out.contains("Second paragraph"));
    assert!(!out.contains("Share this"));
    assert!(!out.contains("Copyright"));
    assert!(!out.lines().any(|l| l == "42" || l == "|"));
}
