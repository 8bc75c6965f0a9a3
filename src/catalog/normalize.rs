//! Text normalization for matching spoken fragments against catalog names

/// French number words mapped to digits
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("un", "1"),
    ("une", "1"),
    ("deux", "2"),
    ("trois", "3"),
    ("quatre", "4"),
    ("cinq", "5"),
    ("six", "6"),
    ("sept", "7"),
    ("huit", "8"),
    ("neuf", "9"),
    ("dix", "10"),
    ("onze", "11"),
    ("douze", "12"),
    ("treize", "13"),
    ("quatorze", "14"),
    ("quinze", "15"),
    ("seize", "16"),
    ("vingt", "20"),
    ("trente", "30"),
    ("quarante", "40"),
    ("cinquante", "50"),
    ("soixante", "60"),
];

/// Normalize text for comparison
///
/// Lowercases, strips accents, turns punctuation into spaces and collapses
/// whitespace. French number words become digits ("quarante journaux" ->
/// "40 journaux", "dix-sept" -> "17").
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match fold_char(c) {
            Some(ascii) => folded.push_str(ascii),
            None if c.is_alphanumeric() => folded.push(c),
            None => folded.push(' '),
        }
    }

    let tokens: Vec<&str> = folded.split_whitespace().collect();

    let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        // dix-sept, dix-huit, dix-neuf (hyphen already turned into a space)
        if tokens[i] == "dix" {
            let teen = match tokens.get(i + 1) {
                Some(&"sept") => Some("17"),
                Some(&"huit") => Some("18"),
                Some(&"neuf") => Some("19"),
                _ => None,
            };
            if let Some(teen) = teen {
                out.push(teen);
                i += 2;
                continue;
            }
        }
        out.push(number_word(tokens[i]).unwrap_or(tokens[i]));
        i += 1;
    }

    out.join(" ")
}

fn number_word(token: &str) -> Option<&'static str> {
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, digit)| *digit)
}

/// ASCII replacement for an accented or ligature lowercase letter
const fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Levenshtein distance between two strings, counted in chars
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Levenshtein distance if it is at most `max`
#[must_use]
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la.abs_diff(lb) > max {
        return None;
    }
    let distance = levenshtein(a, b);
    (distance <= max).then_some(distance)
}
