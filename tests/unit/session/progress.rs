use super::*;

fn event(completed: usize, total: usize) -> ProgressEvent {
    let progress = Progress::new(completed, total);
    ProgressEvent {
        stage: Stage::Generating,
        progress,
        percent: progress.percent(),
    }
}

#[test]
fn fn_progress_forwards_events() {
    let mut seen = Vec::new();
    {
        let mut sink = FnProgress(|e: ProgressEvent| seen.push(e.percent));
        sink.on_progress(event(1, 4));
        sink.on_progress(event(4, 4));
        sink.on_reset(Stage::Generating);
    }
    assert_eq!(seen, vec![25.0, 100.0]);
}

#[test]
fn vec_progress_reset_returns_to_idle() {
    let mut sink = VecProgress::new();
    sink.on_progress(event(1, 2));
    assert_eq!(sink.current(), 50.0);
    sink.on_reset(Stage::Serializing);
    assert_eq!(sink.current(), 0.0);
    assert_eq!(sink.resets, 1);
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let remote = token.clone();
    assert!(!token.is_cancelled());
    std::thread::spawn(move || remote.cancel()).join().unwrap();
    assert!(token.is_cancelled());
}
