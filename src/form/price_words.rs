const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "Trillion"),
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

/// Rupee amount as an Indian-English phrase, e.g. "Twelve Lakh Fifty Thousand Rupees Only"
///
/// Returns an empty string when the text is not a positive whole number.
pub fn price_words(price_text: &str) -> String {
    let digits: String = price_text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let Ok(n) = digits.parse::<u64>() else {
        return String::new();
    };
    if n == 0 {
        return String::new();
    }

    let crore = n / CRORE;
    let lakh = (n % CRORE) / LAKH;
    let remainder = n % LAKH;

    let mut parts = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", cardinal(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", cardinal(lakh)));
    }
    if remainder > 0 {
        parts.push(cardinal(remainder));
    }

    let phrase = parts.join(" ");
    let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    if phrase.is_empty() {
        return String::new();
    }
    format!("{} Rupees Only", capitalize_first(&phrase))
}

/// Standard English cardinal for a positive number, thousand/million grouped
pub fn cardinal(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut words = Vec::new();
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            words.push(format!("{} {}", cardinal(rest / scale), name));
            rest %= scale;
        }
    }
    if rest > 0 {
        words.push(below_thousand(rest));
    }
    words.join(" ")
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
