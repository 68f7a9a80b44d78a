// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ero_recon::image::Image;
use ero_recon::mask_poly::mask_to_polygons;

fn bench_mask_to_polygons(c: &mut Criterion) {
    let mut img: Image<u8> = Image::new(384, 384);
    for y in 100..300 {
        for x in 100..300 {
            if (x + y) % 7 != 0 {
                img.set(x, y, 1);
            }
        }
    }

    c.bench_function("mask_to_polygons 200x200 speckled region", |b| {
        b.iter(|| mask_to_polygons(black_box(&img), |v| v != 0))
    });
}

criterion_group!(benches, bench_mask_to_polygons);
criterion_main!(benches);
