use contract_ledger::similarity::{
    SimilarityMethod, normalize_text, partial_ratio, similarity_breakdown, similarity_score,
    token_sort_ratio,
};

const METHODS: [SimilarityMethod; 2] = [SimilarityMethod::Fuzzy, SimilarityMethod::Sequence];

#[test]
fn identical_after_normalization_scores_full() {
    for method in METHODS {
        assert_eq!(
            similarity_score("М'ячі футбольні", "  м'ячі   ФУТБОЛЬНІ. ", method),
            100.0
        );
        assert_eq!(similarity_score("(Сітка)", "сітка", method), 100.0);
    }
}

#[test]
fn strings_without_shared_characters_score_low() {
    for method in METHODS {
        assert!(similarity_score("сітка", "xyz", method) < 50.0);
        assert!(similarity_score("шт", "kg", method) < 50.0);
        assert!(similarity_score("Доріжки для басейну", "Acme Ltd", method) < 50.0);
    }
}

#[test]
fn empty_inputs_follow_fixed_scores() {
    assert_eq!(similarity_score("", "", SimilarityMethod::Fuzzy), 100.0);
    assert_eq!(similarity_score("", "м'яч", SimilarityMethod::Fuzzy), 0.0);
    assert_eq!(similarity_score("м'яч", "", SimilarityMethod::Sequence), 0.0);
}

#[test]
fn word_order_does_not_matter_for_fuzzy() {
    assert_eq!(
        similarity_score("Футбольний м'яч", "м'яч футбольний", SimilarityMethod::Fuzzy),
        100.0
    );
    assert_eq!(token_sort_ratio("b a", "a b"), 100.0);
}

#[test]
fn partial_ratio_finds_substring() {
    assert_eq!(partial_ratio("select", "мяч select pro"), 100.0);
    assert!(partial_ratio("abc", "xyz") < 1.0);
}

#[test]
fn partial_ratio_checks_edge_windows_for_equal_lengths() {
    assert_eq!(partial_ratio("abcde", "cdefg"), 75.0);
    assert_eq!(partial_ratio("cdefg", "abcde"), 75.0);
    assert_eq!(partial_ratio("abcde", "cdefgh"), 75.0);
    assert_eq!(
        similarity_score("abcde", "cdefg", SimilarityMethod::Fuzzy),
        75.0
    );
}

#[test]
fn one_letter_typo_stays_above_default_threshold() {
    let score = similarity_score(
        "М'ячі футбольні Select",
        "М'ячі футбольні Selekt",
        SimilarityMethod::Fuzzy,
    );
    assert!(score >= 90.0 && score < 100.0, "score was {score}");
}

#[test]
fn scores_stay_in_range() {
    let pairs = [
        ("Сітка волейбольна", "Сітка для волейболу"),
        ("Доріжки", "Доріжки для басейну 25 м"),
        ("a", "aaaaaaaaaa"),
        ("Кубок", "Медалі"),
    ];
    for (left, right) in pairs {
        for method in METHODS {
            let score = similarity_score(left, right, method);
            assert!((0.0..=100.0).contains(&score), "{left} / {right}: {score}");
        }
    }
}

#[test]
fn breakdown_reports_normalized_forms_and_best_metric() {
    let breakdown = similarity_breakdown("Футбольний м'яч!", "м'яч футбольний", SimilarityMethod::Fuzzy);
    assert_eq!(breakdown.normalized_left, "футбольний мяч");
    assert_eq!(breakdown.normalized_right, "мяч футбольний");
    assert_eq!(breakdown.fuzzy.token_sort_ratio, 100.0);
    assert_eq!(breakdown.score, 100.0);
    assert!(breakdown.sequence < 100.0);
}

#[test]
fn normalization_keeps_digits_and_underscores() {
    assert_eq!(normalize_text("Доріжки №5_A"), "доріжки 5_a");
    assert_eq!(normalize_text("\t\n"), "");
}
