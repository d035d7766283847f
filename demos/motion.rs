//! Moves a handful of entities by their velocity each step.

use archegraph::{Registry, Signature};

fn main() {
    let mut registry = Registry::new();

    // a component is a byte size; [x, y] as two little-endian f32s
    let position = registry.component(8);
    let velocity = registry.component(8);

    for i in 0..4u32 {
        let entity = registry.entity();

        registry.attach(entity, position).unwrap();
        registry.attach(entity, velocity).unwrap();

        registry.set(entity, position, &pack(0.0, i as f32)).unwrap();
        registry.set(entity, velocity, &pack(1.0, 0.5)).unwrap();
    }

    registry
        .system(Signature::new([position, velocity]), |view, row| {
            let (x, y) = unpack(view.get(row, 0));
            let (dx, dy) = unpack(view.get(row, 1));

            view.get_mut(row, 0).copy_from_slice(&pack(x + dx, y + dy));
        })
        .unwrap();

    registry
        .system(Signature::new([position]), |view, row| {
            let (x, y) = unpack(view.get(row, 0));

            println!("entity at row {row}: ({x}, {y})");
        })
        .unwrap();

    for tick in 0..3 {
        println!("tick {tick}:");
        registry.step();
    }
}

fn pack(x: f32, y: f32) -> [u8; 8] {
    let mut out = [0; 8];

    out[..4].copy_from_slice(&x.to_le_bytes());
    out[4..].copy_from_slice(&y.to_le_bytes());

    out
}

fn unpack(bytes: &[u8]) -> (f32, f32) {
    (
        f32::from_le_bytes(bytes[..4].try_into().unwrap()),
        f32::from_le_bytes(bytes[4..].try_into().unwrap()),
    )
}
