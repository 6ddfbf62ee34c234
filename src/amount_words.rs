//! Ukrainian amounts in words ("сума прописом").

const ONES_MASCULINE: [&str; 10] = [
    "", "один", "два", "три", "чотири", "п'ять", "шість", "сім", "вісім", "дев'ять",
];
const ONES_FEMININE: [&str; 10] = [
    "", "одна", "дві", "три", "чотири", "п'ять", "шість", "сім", "вісім", "дев'ять",
];
const TEENS: [&str; 10] = [
    "десять",
    "одинадцять",
    "дванадцять",
    "тринадцять",
    "чотирнадцять",
    "п'ятнадцять",
    "шістнадцять",
    "сімнадцять",
    "вісімнадцять",
    "дев'ятнадцять",
];
const TENS: [&str; 10] = [
    "", "", "двадцять", "тридцять", "сорок", "п'ятдесят", "шістдесят", "сімдесят", "вісімдесят",
    "дев'яносто",
];
const HUNDREDS: [&str; 10] = [
    "", "сто", "двісті", "триста", "чотириста", "п'ятсот", "шістсот", "сімсот", "вісімсот",
    "дев'ятсот",
];

#[derive(Clone, Copy)]
enum Gender {
    Masculine,
    Feminine,
}

struct Scale {
    value: u64,
    gender: Gender,
    forms: [&'static str; 3],
}

const SCALES: [Scale; 4] = [
    Scale {
        value: 1_000_000_000_000,
        gender: Gender::Masculine,
        forms: ["трильйон", "трильйони", "трильйонів"],
    },
    Scale {
        value: 1_000_000_000,
        gender: Gender::Masculine,
        forms: ["мільярд", "мільярди", "мільярдів"],
    },
    Scale {
        value: 1_000_000,
        gender: Gender::Masculine,
        forms: ["мільйон", "мільйони", "мільйонів"],
    },
    Scale {
        value: 1_000,
        gender: Gender::Feminine,
        forms: ["тисяча", "тисячі", "тисяч"],
    },
];

pub const HRYVNIA_FORMS: [&str; 3] = ["гривня", "гривні", "гривень"];
pub const KOPIYKA_FORMS: [&str; 3] = ["копійка", "копійки", "копійок"];

/// Picks the singular, paucal or plural form for `n`.
pub fn plural_form(n: u64, forms: [&'static str; 3]) -> &'static str {
    let last = n % 10;
    let last_two = n % 100;
    if last == 1 && last_two != 11 {
        forms[0]
    } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        forms[1]
    } else {
        forms[2]
    }
}

fn push_triad(words: &mut Vec<&'static str>, triad: u64, gender: Gender) {
    let hundreds = (triad / 100) as usize;
    let rest = triad % 100;
    if hundreds > 0 {
        words.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&rest) {
        words.push(TEENS[(rest - 10) as usize]);
        return;
    }
    let tens = (rest / 10) as usize;
    let ones = (rest % 10) as usize;
    if tens > 0 {
        words.push(TENS[tens]);
    }
    if ones > 0 {
        let table = match gender {
            Gender::Masculine => &ONES_MASCULINE,
            Gender::Feminine => &ONES_FEMININE,
        };
        words.push(table[ones]);
    }
}

/// Cardinal number in Ukrainian words, e.g. `2001` → "дві тисячі один".
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "нуль".to_string();
    }

    let mut words = Vec::new();
    let mut remainder = n;
    for scale in &SCALES {
        let count = remainder / scale.value;
        if count == 0 {
            continue;
        }
        remainder %= scale.value;
        if count >= 1000 {
            // Only reachable past the trillions; spell the head recursively.
            let head = number_to_words(count);
            let mut line = head;
            line.push(' ');
            line.push_str(plural_form(count, scale.forms));
            if remainder > 0 {
                line.push(' ');
                line.push_str(&number_to_words(remainder));
            }
            return prefix_words(words, line);
        }
        push_triad(&mut words, count, scale.gender);
        words.push(plural_form(count, scale.forms));
    }
    push_triad(&mut words, remainder, Gender::Masculine);
    words.join(" ")
}

fn prefix_words(words: Vec<&'static str>, tail: String) -> String {
    if words.is_empty() {
        tail
    } else {
        format!("{} {}", words.join(" "), tail)
    }
}

/// Amount in hryvnias and kopecks, e.g. `"сто двадцять гривень, 50 копійок."`.
pub fn amount_to_words(amount: f64) -> String {
    if !amount.is_finite() || amount < 0.0 {
        return format!("нуль {}, 00 {}.", HRYVNIA_FORMS[2], KOPIYKA_FORMS[2]);
    }
    let total_kopecks = (amount * 100.0).round() as u64;
    let hryvnias = total_kopecks / 100;
    let kopecks = total_kopecks % 100;
    format!(
        "{} {}, {:02} {}.",
        number_to_words(hryvnias),
        plural_form(hryvnias, HRYVNIA_FORMS),
        kopecks,
        plural_form(kopecks, KOPIYKA_FORMS)
    )
}

/// Short numeric form used in the `сума` field, e.g. `"120 грн 50 коп."`.
pub fn amount_to_short_text(amount: f64) -> String {
    let total_kopecks = if amount.is_finite() && amount > 0.0 {
        (amount * 100.0).round() as u64
    } else {
        0
    };
    format!("{} грн {:02} коп.", total_kopecks / 100, total_kopecks % 100)
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
