use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sa2event::model::{Attach, EventEntry, ModelData, Node, Scene};
use sa2event::motion::{Motion, MotionKind};
use sa2event::platform::Platform;
use sa2event::types::Vector3;

/// A mid-sized event: 8 scenes, 16 animated entries each, all sharing a
/// pool of 16 models.
fn build_model(platform: Platform) -> ModelData {
    let mut data = ModelData::new(platform);
    let pool = &mut data.pool;

    let mut models = Vec::new();
    let mut motions = Vec::new();
    for i in 0..16 {
        let attach = pool.add_attach(Attach {
            vertex_chunks: (0..256).map(|w| w * 3 + i).collect(),
            poly_chunks: (0..128).map(|w| w * 7 + i).collect(),
            center: Vector3::default(),
            radius: 1.0,
        });
        let child = pool.add_node(Node {
            attach: Some(attach),
            ..Node::default()
        });
        models.push(pool.add_node(Node {
            attach: Some(attach),
            child: Some(child),
            position: Vector3::new(i as f32, 0.0, 0.0),
            ..Node::default()
        }));

        let mut motion = Motion::new(2, 1800, MotionKind::Node);
        for frames in &mut motion.keyframes {
            frames.positions = (0..60).map(|f| (f * 30, Vector3::new(f as f32, 0.0, 0.0))).collect();
            frames.rotations = (0..60).map(|f| (f * 30, [f as i32 * 0x100, 0, 0])).collect();
        }
        motions.push(pool.add_motion(motion));
    }

    let mut root = Scene::new(0);
    for &model in &models {
        root.entries.push(EventEntry {
            model: Some(model),
            ..EventEntry::default()
        });
    }
    data.scenes.push(root);

    for s in 0..8 {
        let mut scene = Scene::new(1800);
        for i in 0..16 {
            scene.entries.push(EventEntry {
                model: Some(models[i]),
                animation: Some(motions[(i + s) % motions.len()]),
                ..EventEntry::default()
            });
        }
        data.scenes.push(scene);
    }

    data
}

fn bench_encode(c: &mut Criterion) {
    let model = build_model(Platform::Dc);

    c.bench_function("encode_dc_event", |b| {
        b.iter(|| black_box(&model).write().unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let model = build_model(Platform::Dc);
    let (data, _) = model.write().unwrap();

    c.bench_function("decode_dc_event", |b| {
        b.iter(|| ModelData::read_as(black_box(&data), Platform::Dc, None).unwrap())
    });
}

fn bench_gc_motion_buffer(c: &mut Criterion) {
    let model = build_model(Platform::Gc);
    let (_, slots) = model.write().unwrap();

    c.bench_function("write_gc_motion_buffer", |b| {
        b.iter(|| sa2event::motion::write_motion_table(black_box(&slots), &model.pool).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_gc_motion_buffer);
criterion_main!(benches);
