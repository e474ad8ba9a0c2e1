#![no_main]

use arbitrary::Arbitrary;
use asplit_layout::{
    AreaConfig, AreaSize, HeadlessRenderer, Point, PointerEvent, PointerEventKind, SizeUnit,
    Split, SplitConfig, WritingDirection,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Plan {
    pixel: bool,
    rtl: bool,
    extent: u16,
    gutter_size: u8,
    gutter_step: u8,
    areas: Vec<AreaSeed>,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
struct AreaSeed {
    size: Option<u16>,
    min: Option<u16>,
    max: Option<u16>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Pointer { kind: u8, gutter: u8, x: i16 },
    Hide(u8),
    Show(u8),
    Resize(u16),
}

fuzz_target!(|plan: Plan| {
    let unit = if plan.pixel {
        SizeUnit::Pixel
    } else {
        SizeUnit::Percent
    };
    let scale = if plan.pixel { 1.0 } else { 0.01 };
    let config = SplitConfig::default()
        .unit(unit)
        .gutter_size(f64::from(plan.gutter_size % 32))
        .gutter_step(f64::from(plan.gutter_step % 16).max(1.0))
        .writing_direction(if plan.rtl {
            WritingDirection::Rtl
        } else {
            WritingDirection::Ltr
        });
    let mut split = Split::new(config, HeadlessRenderer::new(f64::from(plan.extent)));

    let mut ids = Vec::new();
    for seed in plan.areas.iter().take(12) {
        let mut cfg = AreaConfig::default();
        if let Some(size) = seed.size {
            cfg = cfg.with_size(f64::from(size % 10_000) * scale);
        }
        if let Some(min) = seed.min {
            cfg = cfg.with_min_size(f64::from(min % 10_000) * scale);
        }
        if let Some(max) = seed.max {
            cfg = cfg.with_max_size(f64::from(max % 10_000) * scale);
        }
        ids.push(split.add_area(cfg));
    }

    for op in plan.ops.iter().take(256) {
        match *op {
            Op::Pointer { kind, gutter, x } => {
                let kind = match kind % 5 {
                    0 => PointerEventKind::Down,
                    1 | 2 => PointerEventKind::Move,
                    3 => PointerEventKind::Up,
                    _ => PointerEventKind::LostCapture,
                };
                let event = PointerEvent::new(kind, Point::new(f64::from(x), 0.0));
                let gutter = usize::from(gutter % 16);
                split.handle_pointer(event, Some(gutter));
            }
            Op::Hide(i) if !ids.is_empty() => {
                split.hide_area(ids[usize::from(i) % ids.len()]);
            }
            Op::Show(i) if !ids.is_empty() => {
                split.show_area(ids[usize::from(i) % ids.len()]);
            }
            Op::Resize(extent) => {
                split.renderer_mut().set_extent(f64::from(extent));
                split.relayout();
            }
            _ => {}
        }
        check(&split);
    }
});

fn check(split: &Split<HeadlessRenderer>) {
    let registry = split.registry();
    assert!(registry.is_consistent(), "registry inconsistent");

    let orders: Vec<u32> = registry.displayed_areas().map(|a| a.order()).collect();
    for (i, order) in orders.iter().enumerate() {
        assert_eq!(*order as usize, i * 2, "orders not dense: {orders:?}");
    }

    let sizes = split.visible_area_sizes();
    assert_eq!(sizes.len(), registry.displayed().len());
    if sizes.is_empty() {
        return;
    }
    match split.config().unit {
        SizeUnit::Percent => {
            let total: f64 = sizes.iter().filter_map(|s| s.fixed()).sum();
            assert!(
                sizes.iter().all(|s| !s.is_wildcard()),
                "percent wildcard: {sizes:?}"
            );
            assert!((total - 100.0).abs() < 1e-3, "percent sum {total}: {sizes:?}");
        }
        SizeUnit::Pixel => {
            let wildcards = sizes.iter().filter(|s| **s == AreaSize::Wildcard).count();
            assert_eq!(wildcards, 1, "pixel wildcards: {sizes:?}");
        }
    }

    for area in registry.displayed_areas() {
        let Some(size) = area.size().fixed() else {
            continue;
        };
        assert!(size.is_finite() && size >= -1e-6, "bad size {size}");
        if let Some(min) = area.min_size() {
            assert!(size >= min - 1e-6, "{size} below min {min}");
        }
        if let Some(max) = area.max_size() {
            assert!(size <= max + 1e-6, "{size} above max {max}");
        }
    }
}
