use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use crate::{
    ClinicalDocument, LinearModel, Segment, Span, TimeMentionResolver, TimeWordLexicon,
};

fn resolver() -> TimeMentionResolver {
    let lexicon = TimeWordLexicon::parse("WEEKDAY monday\nWEEKDAY friday\nUNIT days").unwrap();
    TimeMentionResolver::new(Arc::new(lexicon))
}

fn weekday_model() -> LinearModel {
    LinearModel {
        bias: -3.0,
        weights: HashMap::from([("BAG_TIME_WORD_TYPE=WEEKDAY".to_string(), 5.0)]),
    }
}

fn document() -> ClinicalDocument {
    ClinicalDocument::new(vec![
        Segment::from_bracketed(
            "Seen Monday .",
            &["(TOP (S (VBN Seen) (NP (NNP Monday)) (. .)))"],
        )
        .unwrap()
        .with_gold(vec![Span::new(5, 11)]),
        Segment::from_bracketed("No complaints .", &["(TOP (S (DT No) (NNS complaints) (. .)))"])
            .unwrap(),
        Segment::from_bracketed(
            "Return Friday .",
            &["(TOP (S (VB Return) (NP (NNP Friday)) (. .)))"],
        )
        .unwrap()
        .with_gold(vec![Span::new(7, 13)]),
    ])
}

#[test]
fn gold_working_sets_are_per_segment() {
    let doc = document();
    let mut instances = Vec::new();
    let reports = doc.train(&resolver(), &mut instances).unwrap();

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.unmatched_gold.is_empty()));
    assert_eq!(
        reports.iter().map(|r| r.instances_written).collect::<Vec<_>>(),
        vec![4, 4, 4]
    );
    assert_eq!(
        instances.iter().filter(|i| i.label.is_mention()).count(),
        2
    );
}

#[test]
fn gold_from_one_segment_does_not_leak_into_another() {
    // same offsets, but the second segment carries no gold
    let doc = ClinicalDocument::new(vec![
        Segment::from_bracketed("Seen Monday", &["(TOP (S (VBN Seen) (NP (NNP Monday))))"])
            .unwrap()
            .with_gold(vec![Span::new(5, 11)]),
        Segment::from_bracketed("Seen Monday", &["(TOP (S (VBN Seen) (NP (NNP Monday))))"])
            .unwrap(),
    ]);
    let mut instances = Vec::new();
    doc.train(&resolver(), &mut instances).unwrap();

    let mentions: Vec<_> = instances.iter().map(|i| i.label.is_mention()).collect();
    // S, VBN, NP (gold) then S, VBN, NP, NNP
    assert_eq!(mentions, vec![false, false, true, false, false, false, false]);
}

#[test]
fn annotate_returns_mentions_per_segment() {
    let doc = document();
    let mentions = doc.annotate(&resolver(), &weekday_model()).unwrap();

    assert_eq!(mentions.len(), 3);
    assert_eq!(
        mentions[0].iter().map(|m| m.span).collect::<Vec<_>>(),
        vec![Span::new(5, 11)]
    );
    assert!(mentions[1].is_empty());
    assert_eq!(
        mentions[2].iter().map(|m| m.span).collect::<Vec<_>>(),
        vec![Span::new(7, 13)]
    );
}

#[test]
fn segments_can_be_annotated_in_parallel() {
    let doc = document();
    let resolver = resolver();
    let model = weekday_model();
    let sequential = doc.annotate(&resolver, &model).unwrap();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = doc
            .segments()
            .iter()
            .map(|segment| {
                let (resolver, model) = (&resolver, &model);
                scope.spawn(move || {
                    let mut mentions = Vec::new();
                    resolver
                        .annotate_segment(segment, model, &mut mentions)
                        .map(|_| mentions)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(parallel, sequential);
}
