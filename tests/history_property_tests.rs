//! Property tests for the bounded history.

mod common;

use common::no_dr;
use dr_screen_lib::{
    HistoryEntry, ImageFile, MockEngine, PreviewHandle, SessionController, SessionHistory,
    UploadedImage, HISTORY_CAPACITY,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn entry(name: String) -> HistoryEntry {
    let image = UploadedImage {
        name,
        mime_type: "image/png".into(),
        size_bytes: 8,
        bytes: Arc::new(vec![1u8; 8]),
        preview: PreviewHandle {
            data_uri: "data:image/png;base64,AQEBAQEBAQE=".into(),
            thumbnail: None,
            width: None,
            height: None,
        },
    };
    HistoryEntry::new(image, no_dr())
}

proptest! {
    /// After N appends the log holds min(N, capacity) entries, newest first.
    #[test]
    fn prop_history_is_bounded_and_newest_first(n in 0usize..40) {
        let mut history = SessionHistory::new();
        for i in 0..n {
            history.append(entry(format!("img-{}.png", i)));
        }

        prop_assert_eq!(history.len(), n.min(HISTORY_CAPACITY));

        let names: Vec<String> = history.list().map(|e| e.filename.clone()).collect();
        let expected: Vec<String> = (0..n)
            .rev()
            .take(HISTORY_CAPACITY)
            .map(|i| format!("img-{}.png", i))
            .collect();
        prop_assert_eq!(names, expected);
    }

    /// Any capacity is honoured, including zero.
    #[test]
    fn prop_custom_capacity(capacity in 0usize..8, n in 0usize..20) {
        let mut history = SessionHistory::with_capacity(capacity);
        for i in 0..n {
            history.append(entry(format!("{}", i)));
        }
        prop_assert_eq!(history.len(), n.min(capacity));
        prop_assert_eq!(history.capacity(), capacity);
    }
}

#[test]
fn eviction_drops_the_oldest() {
    let mut history = SessionHistory::new();
    let first = entry("first.png".into());
    let first_id = first.id;
    history.append(first);
    for i in 0..HISTORY_CAPACITY {
        history.append(entry(format!("{}.png", i)));
    }
    assert!(history.get(first_id).is_none());
    assert_eq!(history.latest().unwrap().filename, format!("{}.png", HISTORY_CAPACITY - 1));
}

#[tokio::test]
async fn controller_history_tracks_n_analyses() {
    for n in [0usize, 1, 9, 10, 11, 25] {
        let controller =
            SessionController::new(Arc::new(MockEngine::with_seed(Duration::ZERO, n as u64)));
        let mut last = None;
        for i in 0..n {
            controller
                .upload(ImageFile::new(format!("{}.png", i), "image/png", vec![0u8; 32]))
                .await
                .unwrap();
            last = Some(controller.analyze().await.unwrap());
        }

        let history = controller.history().await;
        assert_eq!(history.len(), n.min(HISTORY_CAPACITY));
        if let Some(last) = last {
            assert_eq!(history[0].result, last);
            assert_eq!(history[0].filename, format!("{}.png", n - 1));
        }
    }
}
