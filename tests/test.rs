
use std::{fs, path::Path};

use example_document::ExampleDocument;
use pretty_assertions::assert_eq;
use reconcile_merge::{
    CancellationToken, ChangeKind, Differencer, EqualPair, Fragment, MergeAligner, MergeConfig,
    MergeError, MergeSession, Side, TextRole, TokenDifferencer, build_merge_with,
};
use serde::Deserialize;

#[test]
fn test_example_fragments() {
    for doc in &get_all_documents() {
        doc.assert_fragments();
    }
}

#[test]
fn test_example_changes() {
    for doc in &get_all_documents() {
        let mut session = doc.merge();
        doc.assert_changes(&session);
        doc.assert_merged(&mut session, true);
    }
}

#[test]
fn test_example_changes_mirrored() {
    for doc in get_all_documents().iter().map(ExampleDocument::mirrored) {
        let mut session = doc.merge();
        doc.assert_changes(&session);
        doc.assert_merged(&mut session, false);
    }
}

#[test]
fn test_examples_are_loaded() {
    let documents = get_all_documents();

    assert!(documents.len() >= 10);
    assert!(documents.iter().any(|doc| doc.name() == "edits on the same line"));
}

/// Reports the same equal runs regardless of its input.
struct FixedDifferencer {
    left: Vec<EqualPair>,
    right: Vec<EqualPair>,
}

impl Differencer for FixedDifferencer {
    fn equal_pairs(
        &self,
        _base: &str,
        _other: &str,
        side: Side,
    ) -> Result<Vec<EqualPair>, MergeError> {
        Ok(match side {
            Side::Left => self.left.clone(),
            Side::Right => self.right.clone(),
        })
    }
}

#[test]
fn test_custom_differencer() {
    let differencer = FixedDifferencer {
        left: vec![EqualPair::new(Side::Left, 0, 0, 3)],
        right: vec![EqualPair::new(Side::Right, 0, 0, 6)],
    };

    let session = build_merge_with(&differencer, "abcdef", "abcXYZ", "abcdef").unwrap();

    let id = session.first_pending(Side::Left).unwrap();
    assert_eq!(session.change(id).unwrap().kind(), ChangeKind::Modify);
    assert_eq!(session.text(id, TextRole::Base), Some("def"));
    assert_eq!(session.text(id, TextRole::Left), Some("XYZ"));
}

#[test]
fn test_misbehaving_differencer_is_clipped() {
    let differencer = FixedDifferencer {
        left: vec![EqualPair::new(Side::Left, 0, 0, 100)],
        right: vec![EqualPair::new(Side::Right, 0, 0, 100)],
    };

    let session = build_merge_with(&differencer, "abc", "abcd", "abc").unwrap();

    let id = session.first_pending(Side::Left).unwrap();
    assert_eq!(session.text(id, TextRole::Left), Some("d"));
    assert_eq!(session.change_list(Side::Right).count(), 0);
}

#[test]
fn test_cancelled_merge() {
    let cancellation = CancellationToken::new();
    let differencer =
        TokenDifferencer::new(&MergeConfig::default()).with_cancellation(cancellation.clone());
    cancellation.cancel();

    assert_eq!(
        build_merge_with(&differencer, "a\n", "b\n", "c\n").map(|_| ()),
        Err(MergeError::Cancelled)
    );
}

#[test]
fn test_session_from_fragments() {
    let mut aligner = MergeAligner::new();
    aligner.add(EqualPair::new(Side::Left, 0, 0, 2));
    aligner.add(EqualPair::new(Side::Right, 0, 0, 2));
    let fragments = aligner.finish(5, 4, 4);
    assert_eq!(
        fragments,
        vec![Fragment::Conflict {
            base: 2..4,
            left: 2..5,
            right: 2..4
        }]
    );

    assert_eq!(
        MergeSession::from_fragments("ab", "abcde", "abcd", &fragments).map(|_| ()),
        Err(MergeError::RangeOutOfBounds {
            start: 2,
            end: 4,
            length: 2
        })
    );

    let mut session = MergeSession::from_fragments("abcd", "abXYZ", "abcd", &fragments).unwrap();
    session.remove(session.first_pending(Side::Right).unwrap()).unwrap();
    session.apply(session.first_pending(Side::Left).unwrap(), TextRole::Left).unwrap();

    assert_eq!(session.document(TextRole::Base).text(), "abXYZ");
    assert!(session.is_fully_merged());
}

fn get_all_documents() -> Vec<ExampleDocument> {
    let examples_dir = Path::new("tests/examples");
    let entries = fs::read_dir(examples_dir)
        .expect("Failed to read examples directory")
        .collect::<Vec<_>>();

    let mut documents = Vec::new();

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("yml") {
            let file = fs::File::open(&path).expect("Failed to open example file");
            for document in serde_yaml::Deserializer::from_reader(file) {
                let doc =
                    ExampleDocument::deserialize(document).expect("Failed to deserialize document");
                documents.push(doc);
            }
        }
    }

    documents
}
