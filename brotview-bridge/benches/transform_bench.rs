use criterion::{black_box, criterion_group, criterion_main, Criterion};

use brotview_bridge::{visible_tiles, TILE_SIZE};
use brotview_core::{
    aspect::go_home, forward, inverse, Complex, Destination, EntryMode, NormPoint, PixelRect,
    View, ViewportState,
};

fn plot() -> View {
    View::new(Complex::new(-3.0, -2.0), Complex::new(4.0, 4.0)).unwrap()
}

fn deep_viewport() -> ViewportState {
    let mut vp = ViewportState::new(1920, 1080).unwrap();
    go_home(&mut vp, &plot());
    vp.zoom = 1e9;
    vp.centre = NormPoint::new(0.437_512_5, 0.512_345_6);
    vp
}

fn bench_forward(c: &mut Criterion) {
    let meta = plot();
    let vp = deep_viewport();
    let rect = PixelRect::full(1920, 1080);

    c.bench_function("forward_1920x1080", |b| {
        b.iter(|| forward(black_box(rect), black_box(&vp), black_box(&meta)));
    });
}

fn bench_inverse(c: &mut Criterion) {
    let meta = plot();
    let dest = Destination {
        mode: EntryMode::Centre,
        centre_real: Some(-0.743_643_887),
        centre_imag: Some(0.131_825_904),
        axes_real: Some(1e-8),
        ..Default::default()
    };

    c.bench_function("inverse_centre_entry", |b| {
        b.iter(|| inverse(black_box(&dest), black_box(&meta), 1920, 1080));
    });
}

fn bench_visible_tiles(c: &mut Criterion) {
    let vp = deep_viewport();

    c.bench_function("visible_tiles_1920x1080", |b| {
        b.iter(|| visible_tiles(black_box(&vp), TILE_SIZE));
    });
}

criterion_group!(benches, bench_forward, bench_inverse, bench_visible_tiles);
criterion_main!(benches);
