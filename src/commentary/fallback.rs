//! Canned lines used whenever the service can't be reached

use rand::Rng;

use super::request::Lang;

const EN: &[&str] = &[
    "My grandma aims better than that.",
    "You're shooting at clouds, genius.",
    "Did the duck pay you to miss?",
    "404: Aim Not Found.",
];

const HI: &[&str] = &[
    "Kya kar raha hai bhai?",
    "Nishana hai ya mazaak?",
    "Tujhse na ho payega beta.",
    "Ghar jaake Ludo khel.",
];

const HR: &[&str] = &[
    "Re bawli booch!",
    "Ke kar rahya se?",
    "Goli khaa lega ke?",
    "Tere bas ki naa se.",
];

const RJ: &[&str] = &[
    "Kai kar ryo hai chora?",
    "Bhaaya kai nishano hai tharo?",
    "Mane lage thare bas ki koni.",
    "Paani pi le, thak gyo hola.",
];

/// All fallback lines for a language
pub fn lines(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::En => EN,
        Lang::Hi => HI,
        Lang::Hr => HR,
        Lang::Rj => RJ,
    }
}

/// Pick one fallback line at random
pub fn pick<R: Rng + ?Sized>(lang: Lang, rng: &mut R) -> &'static str {
    let lines = lines(lang);
    lines[rng.random_range(0..lines.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_every_language_has_lines() {
        for lang in Lang::ALL {
            assert!(!lines(lang).is_empty());
            assert!(lines(lang).iter().all(|l| !l.trim().is_empty()));
        }
    }

    #[test]
    fn test_pick_stays_in_language() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let line = pick(Lang::Rj, &mut rng);
            assert!(RJ.contains(&line));
        }
    }
}
