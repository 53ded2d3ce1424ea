use factpost::fonts::{default_font_candidates, resolve_face, MonospaceMetrics, TextMeasure};
use factpost::rendering::wrap::wrap_text;

const WORDS: &[&str] = &[
    "OCTOPUSES", "HAVE", "THREE", "HEARTS", "AND", "BLUE", "BLOOD", "A", "OF", "HONEY",
    "NEVER", "EXPIRES", "SUPERCALIFRAGILISTICEXPIALIDOCIOUS", "3000", "YEAR", "-", "'FLAMBOYANCE'",
];

/// Deterministic headline generator (xorshift) so failures are reproducible.
fn headlines(count: usize) -> Vec<String> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    (0..count)
        .map(|_| {
            let n = 1 + (next() % 20) as usize;
            (0..n)
                .map(|_| WORDS[(next() % WORDS.len() as u64) as usize])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn check_properties<M: TextMeasure>(metrics: &M, max_width: u32) {
    for text in headlines(200) {
        let wrapped = wrap_text(&text, metrics, max_width);

        // width bound, except lone words
        for line in wrapped.lines() {
            if metrics.measure(line).width > max_width {
                assert!(!line.contains(' '), "multi-word line {:?} exceeds {}", line, max_width);
            }
        }

        // no words dropped or duplicated
        let rejoined = wrapped.lines().join(" ");
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined.split_whitespace().collect::<Vec<_>>(), original);

        // deterministic
        assert_eq!(wrapped, wrap_text(&text, metrics, max_width));
    }
}

#[test]
fn wrap_properties_hold_for_monospace_metrics() {
    check_properties(&MonospaceMetrics::new(40, 80), 993);
    check_properties(&MonospaceMetrics::new(7, 14), 120);
}

#[test]
fn wrap_properties_hold_for_real_font() {
    let Ok(face) = resolve_face(&default_font_candidates()) else {
        println!("No font available; skipping");
        return;
    };
    check_properties(&face.at(84.0), 993);
    check_properties(&face.at(36.0), 400);
}

#[test]
fn lines_are_maximal() {
    // Greedy: the first word of each following line did not fit on the previous one.
    let m = MonospaceMetrics::new(10, 20);
    for text in headlines(100) {
        let wrapped = wrap_text(&text, &m, 150);
        for pair in wrapped.lines().windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            let joined = format!("{} {}", pair[0], first_word);
            assert!(m.measure(&joined).width > 150, "{:?} could have taken {:?}", pair[0], first_word);
        }
    }
}
