use criterion::{Criterion, criterion_group, criterion_main};
use crtmon_monitor::{Frame, Monitor, MonitorDisplay, Overlay, Pixel, config::MonitorSettings};
use palette::Srgba;
use std::hint::black_box;

#[derive(Debug)]
struct NullDisplay;

impl MonitorDisplay for NullDisplay {
    fn present_frame(&mut self, frame: &Frame, _overlay: Overlay<'_>) {
        black_box(frame);
    }

    fn present_idle(&mut self, _overlay: Overlay<'_>) {}
}

fn criterion_benchmark(c: &mut Criterion) {
    let monitor = Monitor::new(
        MonitorSettings {
            refresh_rate: 0.0,
            ..Default::default()
        },
        NullDisplay,
    )
    .unwrap();
    let row: Vec<Pixel> = (0..228)
        .map(|x| Srgba::new(x as u8, 0x40, 0x80, 0xff))
        .collect();

    c.bench_function("submit_scanline", |b| {
        b.iter(|| {
            black_box(monitor.submit_line(Some(&row), false));
        })
    });

    c.bench_function("submit_ntsc_frame", |b| {
        b.iter(|| {
            for line in 0..262 {
                black_box(monitor.submit_line(Some(&row), line >= 260));
            }
        })
    });

    c.bench_function("present_current_frame", |b| {
        b.iter(|| {
            black_box(monitor.refresh());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
