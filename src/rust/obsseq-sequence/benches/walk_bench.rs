// Copyright 2026 Observatory Sequence Tools Contributors
// SPDX-License-Identifier: Apache-2.0

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use obsseq_config::{Parameter, SysConfig};
use obsseq_sequence::{CbOptions, ObserveSpec, ObserveType, SequenceDriver, SequenceNode};
use std::hint::black_box;

/// Offsets outside, filters inside, one observe per filter.
fn dither_tree(offsets: usize, filters: usize) -> SequenceNode {
    let offsets = SysConfig::new("telescope")
        .with_parameter(Parameter::new("p", (0..offsets).map(|i| i as f64 * 1.5)))
        .with_parameter(Parameter::single("q", 0.0));
    let filters = SysConfig::new("instrument")
        .with_parameter(Parameter::new("filter", (0..filters).map(|i| format!("F{i}"))))
        .with_parameter(Parameter::single("readMode", "FAINT"));
    SequenceNode::root().with_child(
        SequenceNode::config_iterator(offsets).with_child(
            SequenceNode::instrument_iterator("GNIRS", filters)
                .with_child(SequenceNode::observe(ObserveSpec::new(ObserveType::Object, 2))),
        ),
    )
}

fn bench_full_walk(c: &mut Criterion) {
    let sizes = [(4, 4), (16, 8), (64, 16)];

    let mut group = c.benchmark_group("walk");

    for &(offsets, filters) in &sizes {
        let root = dither_tree(offsets, filters);
        let driver = SequenceDriver::default();
        group.bench_with_input(
            BenchmarkId::new("full", offsets * filters * 2),
            &root,
            |b, root| b.iter(|| black_box(driver.walk(root))),
        );
    }

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let root = dither_tree(64, 16);
    let driver = SequenceDriver::new(CbOptions::preview());
    c.bench_function("preview", |b| b.iter(|| black_box(driver.walk(&root))));
}

criterion_group!(benches, bench_full_walk, bench_preview);
criterion_main!(benches);
