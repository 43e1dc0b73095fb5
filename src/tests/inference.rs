use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    Category, ClassScore, FeatureVector, LinearModel, Segment, SegmentDisplay, Span,
    SpanClassifier, TimeMention, TimeMentionResolver, TimeWordLexicon, TimexError, TimexResult,
};

/// Classifier answering from a closure and counting calls.
struct Scripted<F> {
    rule: F,
    calls: Cell<usize>,
}

impl<F> Scripted<F>
where
    F: Fn(&FeatureVector) -> (Category, Vec<ClassScore>),
{
    fn new(rule: F) -> Self {
        Self {
            rule,
            calls: Cell::new(0),
        }
    }
}

impl<F> SpanClassifier for Scripted<F>
where
    F: Fn(&FeatureVector) -> (Category, Vec<ClassScore>),
{
    fn classify(&self, features: &FeatureVector) -> TimexResult<Category> {
        self.calls.set(self.calls.get() + 1);
        Ok((self.rule)(features).0)
    }

    fn score(&self, features: &FeatureVector) -> TimexResult<Vec<ClassScore>> {
        Ok((self.rule)(features).1)
    }
}

struct Broken;

impl SpanClassifier for Broken {
    fn classify(&self, _features: &FeatureVector) -> TimexResult<Category> {
        Err(TimexError::Classification {
            message: "model not ready".to_string(),
        })
    }

    fn score(&self, _features: &FeatureVector) -> TimexResult<Vec<ClassScore>> {
        Err(TimexError::Classification {
            message: "model not ready".to_string(),
        })
    }
}

fn scores(first: (Category, f64), second: (Category, f64)) -> Vec<ClassScore> {
    vec![
        ClassScore {
            category: first.0,
            score: first.1,
        },
        ClassScore {
            category: second.0,
            score: second.1,
        },
    ]
}

fn not_a_mention() -> (Category, Vec<ClassScore>) {
    (
        Category::NonMention,
        scores((Category::NonMention, 0.7), (Category::Mention, 0.3)),
    )
}

fn is_monday_leaf(features: &FeatureVector) -> bool {
    features.has_indicator("IS_LEAF") && features.count("BAG_TEXT", Some("Monday")) > 0
}

fn resolver() -> TimeMentionResolver {
    let lexicon = TimeWordLexicon::parse("WEEKDAY monday\nUNIT days\nFREQUENCY daily").unwrap();
    TimeMentionResolver::new(Arc::new(lexicon))
}

fn seen_monday() -> Segment {
    Segment::from_bracketed("Seen Monday", &["(TOP (S (VBN Seen) (NP (NNP Monday))))"]).unwrap()
}

#[test]
fn monday_leaf_becomes_one_mention() {
    let segment = seen_monday();
    let classifier = Scripted::new(|features: &FeatureVector| {
        if is_monday_leaf(features) {
            (
                Category::Mention,
                scores((Category::Mention, 0.92), (Category::NonMention, 0.08)),
            )
        } else {
            not_a_mention()
        }
    });

    let mut mentions = Vec::new();
    let report = resolver()
        .annotate_segment(&segment, &classifier, &mut mentions)
        .unwrap();

    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].begin(), 5);
    assert_eq!(mentions[0].end(), 5 + "Monday".len());
    assert!((mentions[0].confidence - 0.92).abs() < 1e-9);
    assert_eq!(report.mentions_found, 1);
    // S, VBN, NP, NNP
    assert_eq!(classifier.calls.get(), 4);

    let display = SegmentDisplay::new(&segment).with_mentions(&mentions);
    insta::assert_snapshot!(display, @r###"
    Seen  Monday
          ╰────╯TimeMention { confidence: 0.92 }
    "###);
}

#[test]
fn mention_offsets_count_characters() {
    let text = "T 38.5°C, seen Monday";
    let segment = Segment::from_bracketed(
        text,
        &["(TOP (S (NP (NN T) (CD 38.5°C)) (, ,) (VP (VBN seen) (NP (NNP Monday)))))"],
    )
    .unwrap();
    let classifier = Scripted::new(|features: &FeatureVector| {
        if is_monday_leaf(features) {
            (
                Category::Mention,
                scores((Category::Mention, 0.9), (Category::NonMention, 0.1)),
            )
        } else {
            not_a_mention()
        }
    });

    let mut mentions = Vec::new();
    resolver()
        .annotate_segment(&segment, &classifier, &mut mentions)
        .unwrap();

    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].span, Span::new(15, 21));
    assert_eq!(segment.covered_text(mentions[0].span), Some("Monday"));
}

#[test]
fn confidence_is_the_first_listed_score() {
    let segment = seen_monday();
    let classifier = Scripted::new(|features: &FeatureVector| {
        if is_monday_leaf(features) {
            (
                Category::Mention,
                scores((Category::NonMention, 0.6), (Category::Mention, 0.4)),
            )
        } else {
            not_a_mention()
        }
    });

    let mut mentions = Vec::new();
    resolver()
        .annotate_segment(&segment, &classifier, &mut mentions)
        .unwrap();

    assert_eq!(mentions.len(), 1);
    assert!((mentions[0].confidence - 0.6).abs() < 1e-9);
}

#[test]
fn mention_nodes_end_the_descent() {
    let segment = seen_monday();
    let classifier = Scripted::new(|_: &FeatureVector| {
        (
            Category::Mention,
            scores((Category::Mention, 0.8), (Category::NonMention, 0.2)),
        )
    });

    let mut mentions = Vec::new();
    let report = resolver()
        .annotate_segment(&segment, &classifier, &mut mentions)
        .unwrap();

    assert_eq!(report.visited.len(), 1);
    assert_eq!(
        mentions,
        vec![TimeMention {
            span: Span::new(0, 11),
            confidence: 0.8,
        }]
    );
}

#[test]
fn long_evidence_free_span_is_classified_but_not_descended() {
    let text = "The patient reported mild nausea and denied chest pain with exertion or dyspnea at rest .";
    let tree = "(TOP (S (NP (DT The) (NN patient)) (VP (VBD reported) (NP (JJ mild) (NN nausea))) (CC and) (VP (VBD denied) (NP (NN chest) (NN pain)) (PP (IN with) (NP (NN exertion) (CC or) (NN dyspnea))) (PP (IN at) (NP (NN rest)))) (. .)))";
    let segment = Segment::from_bracketed(text, &[tree]).unwrap();
    let classifier = Scripted::new(|_: &FeatureVector| not_a_mention());

    let mut mentions = Vec::new();
    let report = resolver()
        .annotate_segment(&segment, &classifier, &mut mentions)
        .unwrap();

    assert_eq!(classifier.calls.get(), 1);
    assert_eq!(report.visited.len(), 1);
    assert!(mentions.is_empty());
}

#[test]
fn empty_score_list_fails_the_segment() {
    let classifier = Scripted::new(|_: &FeatureVector| (Category::NonMention, Vec::new()));
    let mut mentions = Vec::new();
    let result = resolver().annotate_segment(&seen_monday(), &classifier, &mut mentions);
    assert!(matches!(result, Err(TimexError::Classification { .. })));
}

#[test]
fn classifier_errors_propagate() {
    let mut mentions = Vec::new();
    let result = resolver().annotate_segment(&seen_monday(), &Broken, &mut mentions);
    assert!(matches!(result, Err(TimexError::Classification { .. })));
    assert!(mentions.is_empty());
}

#[test]
fn repeated_runs_give_identical_mentions() {
    let text = "Take aspirin daily for three days . Return Monday .";
    let segment = Segment::from_bracketed(
        text,
        &[
            "(TOP (S (VP (VB Take) (NP (NN aspirin)) (ADVP (RB daily)) (PP (IN for) (NP (CD three) (NNS days)))) (. .)))",
            "(TOP (S (VP (VB Return) (NP (NNP Monday))) (. .)))",
        ],
    )
    .unwrap();
    let model = LinearModel {
        bias: -3.0,
        weights: HashMap::from([
            ("BAG_TIME_WORD_TYPE=WEEKDAY".to_string(), 5.0),
            ("BAG_TIME_WORD_TYPE=FREQUENCY".to_string(), 4.0),
            ("PRODUCTION=IN_NP".to_string(), 2.5),
            ("BAG_TEXT=days".to_string(), 1.0),
        ]),
    };
    let resolver = resolver();

    let mut first = Vec::new();
    let first_report = resolver.annotate_segment(&segment, &model, &mut first).unwrap();
    let mut second = Vec::new();
    let second_report = resolver.annotate_segment(&segment, &model, &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);

    let texts: Vec<&str> = first
        .iter()
        .filter_map(|m| segment.covered_text(m.span))
        .collect();
    assert_eq!(texts, vec!["daily", "for three days", "Monday"]);

    let unique: HashSet<_> = first_report.visited.iter().map(|v| (v.tree, v.node)).collect();
    assert_eq!(unique.len(), first_report.visited.len());
}
