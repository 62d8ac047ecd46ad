use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use keyguide::keyboard::{KeyId, KeyboardLayout};
use keyguide::navigation::derive_view_model;
use keyguide::session::input::{Chord, InputEvent, InputMachine};
use keyguide::session::lesson::{Attempt, Stream, TargetSymbol};
use keyguide::session::progression::{
    Phase, ProgressionEvent, ProgressionMachine, ProgressionSnapshot,
};

fn qwerty() -> KeyboardLayout {
    KeyboardLayout::load_with_user_dir(None, "qwerty").unwrap()
}

fn bench_shortest_path(c: &mut Criterion) {
    let layout = qwerty();
    let graph = layout.graph();

    c.bench_function("shortest_path (F -> T)", |b| {
        b.iter(|| graph.shortest_path(black_box(KeyId::KeyF), black_box(KeyId::KeyT)))
    });
    c.bench_function("shortest_path (Backquote -> ControlRight)", |b| {
        b.iter(|| graph.shortest_path(black_box(KeyId::Backquote), black_box(KeyId::ControlRight)))
    });
}

fn bench_derive_view_model(c: &mut Criterion) {
    let layout = qwerty();
    let target = TargetSymbol::resolve('T', &layout);
    let now = Instant::now();
    let pressed = BTreeSet::from([KeyId::ShiftLeft, KeyId::KeyN]);
    let miss = Attempt::evaluate(&target, pressed, now, now, true);
    let snapshot = ProgressionSnapshot {
        phase: Phase::AwaitingInput,
        cursor: 0,
        length: 1,
        target: Some(target),
        last_attempt: Some(miss),
    };

    c.bench_function("derive_view_model (out-of-cluster error)", |b| {
        b.iter(|| derive_view_model(black_box(&snapshot), &layout))
    });
}

fn bench_full_lesson(c: &mut Criterion) {
    let layout = Arc::new(qwerty());
    let text = "the quick brown fox jumps over the lazy dog ".repeat(10);

    c.bench_function("type 440-symbol lesson", |b| {
        b.iter(|| {
            let stream = Stream::from_text(&text, &layout);
            let (tx, _rx) = mpsc::channel();
            let Ok(mut lesson) = ProgressionMachine::new(stream, Arc::clone(&layout), tx) else {
                return;
            };
            let mut input = InputMachine::new();
            for ch in text.chars() {
                let Some(key) = layout.key_for_char(ch) else {
                    continue;
                };
                if let Some(chord) = input.handle(InputEvent::KeyDown(key)) {
                    lesson.handle(ProgressionEvent::Chord(chord));
                }
                input.handle(InputEvent::KeyUp(key));
                black_box(derive_view_model(&lesson.snapshot(), &layout));
            }
        })
    });
}

fn bench_stream_resolution(c: &mut Criterion) {
    let layout = qwerty();
    let text = "Pack my box with five dozen liquor jugs! ".repeat(25);

    c.bench_function("Stream::from_text (1000 chars)", |b| {
        b.iter(|| Stream::from_text(black_box(&text), &layout))
    });
    c.bench_function("Chord::new (3 keys)", |b| {
        b.iter(|| {
            Chord::new(black_box([KeyId::ShiftRight, KeyId::KeyT, KeyId::KeyG]), Instant::now())
        })
    });
}

criterion_group!(
    benches,
    bench_shortest_path,
    bench_derive_view_model,
    bench_full_lesson,
    bench_stream_resolution
);
criterion_main!(benches);
