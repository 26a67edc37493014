use sa2event::model::{
    entry_flags, Attach, BigEntry, EventEntry, ModelData, Node, Reflection, Scene, TextureName,
    TextureNameList,
};
use sa2event::motion::surface::{
    SurfaceAnimation, SurfaceAnimationBlock, SurfaceAnimationData, TextureAnimSequence, UvFrame,
};
use sa2event::motion::{Camera, EventMotion, Motion, MotionKind};
use sa2event::platform::Platform;
use sa2event::types::Vector3;
use sa2event::EventError;

fn sample_motion(node_count: u32, kind: MotionKind, seed: f32) -> Motion {
    let mut motion = Motion::new(node_count, 240, kind);
    for (i, frames) in motion.keyframes.iter_mut().enumerate() {
        frames.positions = vec![
            (0, Vector3::new(seed, i as f32, 0.0)),
            (120, Vector3::new(seed + 1.0, 0.0, -3.0)),
        ];
        frames.rotations = vec![(0, [0, 0x4000, 0]), (240, [0, 0x8000, 0x100])];
        frames.scales = vec![(0, Vector3::new(1.0, 1.0, 1.0))];
    }
    motion
}

/// Builds a small but fully featured event graph: two scenes, shared
/// models and attaches, node/shape/camera/particle/big motions, textures,
/// reflections, upgrade and blare tables and a surface animation.
fn build_model(platform: Platform) -> ModelData {
    let mut data = ModelData::new(platform);
    let pool = &mut data.pool;

    let shared_attach = pool.add_attach(Attach {
        vertex_chunks: vec![0x2200_0010, 0x0000_0004, 0x3F80_0000],
        poly_chunks: vec![0x1A40_0008, 0x0000_0042, 0x0000_1234],
        center: Vector3::new(0.0, 1.0, 0.0),
        radius: 2.5,
    });

    let hero_child = pool.add_node(Node {
        attach: Some(shared_attach),
        position: Vector3::new(0.0, 1.2, 0.0),
        ..Node::default()
    });
    let hero = pool.add_node(Node {
        attach: Some(shared_attach),
        child: Some(hero_child),
        ..Node::default()
    });
    let rival = pool.add_node(Node {
        attach: Some(shared_attach),
        position: Vector3::new(4.0, 0.0, -2.0),
        ..Node::default()
    });
    let big_model = pool.add_node(Node::default());
    let upgrade_model = pool.add_node(Node {
        rotation: [0, 0x2000, 0],
        ..Node::default()
    });

    let hero_anim = pool.add_motion(sample_motion(2, MotionKind::Node, 1.0));
    let hero_shape = pool.add_motion(sample_motion(2, MotionKind::Shape, 2.0));
    let rival_anim = pool.add_motion(sample_motion(1, MotionKind::Node, 3.0));
    let camera_anim = pool.add_motion(sample_motion(1, MotionKind::Camera, 4.0));
    let particle_anim = pool.add_motion(sample_motion(1, MotionKind::Node, 5.0));
    let big_anim = pool.add_motion(sample_motion(1, MotionKind::Node, 6.0));

    let camera = pool.add_camera(Camera {
        position: Vector3::new(0.0, 5.0, -10.0),
        field_of_view: 1.0,
        near_clip: 0.1,
        far_clip: 4000.0,
        dir_z: Vector3::new(0.0, 0.0, 1.0),
        ..Camera::default()
    });

    // root scene holds the shared models and plays nothing
    let mut root = Scene::new(0);
    root.entries.push(EventEntry {
        model: Some(hero),
        attributes: entry_flags::REFLECTION,
        ..EventEntry::default()
    });
    root.entries.push(EventEntry {
        model: Some(rival),
        ..EventEntry::default()
    });

    let mut scene = Scene::new(240);
    scene.entries.push(EventEntry {
        model: Some(hero),
        animation: Some(hero_anim),
        shape_animation: Some(hero_shape),
        ..EventEntry::default()
    });
    scene.entries.push(EventEntry {
        model: Some(rival),
        animation: Some(rival_anim),
        ..EventEntry::default()
    });
    for entry in &mut root.entries {
        entry.auto_animation_attributes();
    }
    for entry in &mut scene.entries {
        entry.auto_animation_attributes();
    }
    scene.camera_animations.push(EventMotion {
        animation: Some(camera_anim),
        camera: Some(camera),
    });
    scene.particle_motions.push(Some(particle_anim));
    scene.particle_motions.push(None);
    scene.big = Some(BigEntry {
        model: Some(big_model),
        motions: vec![(Some(big_anim), None)],
        unknown: 0,
    });
    data.scenes.push(root);
    data.scenes.push(scene);

    data.texture_names = TextureNameList {
        names: vec![
            TextureName {
                name: Some("ev_hero_body".to_string()),
                attributes: 0,
            },
            TextureName {
                name: Some("ev_hero_eye".to_string()),
                attributes: 2,
            },
        ],
    };
    data.texture_dimensions = vec![(128, 128), (64, 32)];

    data.reflections.reflections.push(Reflection {
        transparency: 0x40,
        vertex1: Vector3::new(-10.0, 0.0, -10.0),
        vertex2: Vector3::new(10.0, 0.0, -10.0),
        vertex3: Vector3::new(10.0, 0.0, 10.0),
        vertex4: Vector3::new(-10.0, 0.0, 10.0),
    });

    data.blare_models[0] = Some(hero);
    data.blare_models[63] = Some(rival);
    data.integrated_upgrades[0][0] = Some(hero);
    data.integrated_upgrades[30][2] = Some(rival);
    data.tails_tails = Some(rival);

    data.overlay_upgrades[0].root = Some(hero);
    data.overlay_upgrades[0].target1 = Some(hero_child);
    data.overlay_upgrades[0].model1 = Some(upgrade_model);

    if platform.has_surface_animations() {
        data.surface_animations = Some(SurfaceAnimationData {
            blocks: vec![SurfaceAnimationBlock {
                model: hero,
                animations: vec![
                    Some(SurfaceAnimation {
                        texture_id: 1,
                        texture_target: (shared_attach, 1),
                        uv_frames: vec![
                            UvFrame {
                                target: (shared_attach, 0),
                                u: 128,
                                v: -64,
                            },
                            UvFrame {
                                target: (shared_attach, 2),
                                u: 0,
                                v: 256,
                            },
                        ],
                    }),
                    None,
                ],
            }],
            texture_sequences: vec![TextureAnimSequence {
                texture_id: 1,
                texture_count: 4,
            }],
        });
    }

    data
}

/// Structural checks on a decoded graph that hold for every platform.
fn assert_graph_shape(decoded: &ModelData) {
    assert_eq!(decoded.scenes.len(), 2);
    assert_eq!(decoded.scenes[0].entries.len(), 2);
    assert_eq!(decoded.scenes[1].entries.len(), 2);
    assert_eq!(decoded.scenes[1].frame_count, 240);

    // the hero model is the same object in both scenes
    let hero = decoded.scenes[0].entries[0].model.unwrap();
    assert_eq!(decoded.scenes[1].entries[0].model, Some(hero));

    // and all nodes share a single attach
    let child = decoded.pool.node(hero).child.unwrap();
    let attach = decoded.pool.node(hero).attach.unwrap();
    assert_eq!(decoded.pool.node(child).attach, Some(attach));
    let rival = decoded.scenes[1].entries[1].model.unwrap();
    assert_eq!(decoded.pool.node(rival).attach, Some(attach));
    assert_eq!(decoded.pool.attach(attach).poly_chunks.len(), 3);

    // table slots resolve to scene models, not copies
    assert_eq!(decoded.blare_models[0], Some(hero));
    assert_eq!(decoded.blare_models[63], Some(rival));
    assert_eq!(decoded.tails_tails, Some(rival));
    assert_eq!(decoded.integrated_upgrades[0][0], Some(hero));
    assert_eq!(decoded.overlay_upgrades[0].root, Some(hero));
    assert_eq!(decoded.overlay_upgrades[0].target1, decoded.pool.node(hero).child);

    // motions decode with their content intact
    let hero_anim = decoded.scenes[1].entries[0].animation.unwrap();
    let motion = decoded.pool.motion(hero_anim);
    assert_eq!(motion.kind, MotionKind::Node);
    assert_eq!(motion.node_count, 2);
    assert_eq!(motion.keyframes[1].positions[0].1.y, 1.0);

    let camera_slot = decoded.scenes[1].camera_animations[0];
    let camera_anim = camera_slot.animation.unwrap();
    assert_eq!(decoded.pool.motion(camera_anim).kind, MotionKind::Camera);
    let camera = decoded.pool.camera(camera_slot.camera.unwrap());
    assert_eq!(camera.position, Vector3::new(0.0, 5.0, -10.0));

    let big = decoded.scenes[1].big.as_ref().unwrap();
    assert!(big.model.is_some());
    assert_eq!(big.motions.len(), 1);
    assert!(big.motions[0].0.is_some());

    assert_eq!(decoded.texture_names.names.len(), 2);
    assert_eq!(
        decoded.texture_names.names[0].name.as_deref(),
        Some("ev_hero_body")
    );
    assert_eq!(decoded.texture_dimensions, vec![(128, 128), (64, 32)]);
    assert_eq!(decoded.reflections.reflections.len(), 1);
    assert_eq!(decoded.reflections.reflections[0].transparency, 0x40);
}

#[test]
fn dc_roundtrip_is_stable() {
    let model = build_model(Platform::Dc);
    let (first, _) = model.write().unwrap();
    let decoded = ModelData::read_as(&first, Platform::Dc, None).unwrap();

    assert_graph_shape(&decoded);
    let surface = decoded.surface_animations.as_ref().unwrap();
    assert_eq!(surface.blocks.len(), 1);
    assert_eq!(surface.blocks[0].animations.len(), 2);
    let anim = surface.blocks[0].animations[0].as_ref().unwrap();
    assert_eq!(anim.uv_frames.len(), 2);
    assert_eq!(anim.uv_frames[0].u, 128);
    // single inline sequence layout
    assert_eq!(surface.texture_sequences.len(), 1);

    // decoding and re-encoding reproduces the buffer byte for byte
    let (second, _) = decoded.write().unwrap();
    assert_eq!(first, second);
}

#[test]
fn dcbeta_roundtrip_skips_surface_animations() {
    let model = build_model(Platform::DcBeta);
    let (first, _) = model.write().unwrap();
    let decoded = ModelData::read_as(&first, Platform::DcBeta, None).unwrap();

    assert_graph_shape(&decoded);
    assert!(decoded.surface_animations.is_none());
    // only the first 14 overlay upgrade slots exist on this variant
    assert_eq!(decoded.overlay_upgrades[0].root, decoded.scenes[0].entries[0].model);

    let (second, _) = decoded.write().unwrap();
    assert_eq!(first, second);
}

#[test]
fn dcgc_roundtrip_is_big_endian() {
    let model = build_model(Platform::DcGc);
    let (first, _) = model.write().unwrap();

    // scene array pointer resolves against the big endian image base
    let head = u32::from_be_bytes([first[0], first[1], first[2], first[3]]);
    assert!(head >= Platform::DcGc.main_image_base());

    let decoded = ModelData::read_as(&first, Platform::DcGc, None).unwrap();
    assert_graph_shape(&decoded);

    let (second, _) = decoded.write().unwrap();
    assert_eq!(first, second);
}

#[test]
fn gc_roundtrip_with_motion_buffer() {
    let mut model = build_model(Platform::Gc);
    model.enable_drop_shadows = true;

    let shadow = model.pool.add_node(Node::default());
    model.scenes[1].entries[0].shadow_model = Some(shadow);
    model.scenes[1].entries[1].layer = 3;

    let (first, slots) = model.write().unwrap();
    let motion_first = sa2event::motion::write_motion_table(&slots, &model.pool).unwrap();

    // the platform heuristic recognizes the written buffer
    assert_eq!(Platform::detect(&first).unwrap(), Platform::Gc);

    let decoded = ModelData::read(&first, Some(&motion_first)).unwrap();
    assert_eq!(decoded.platform, Platform::Gc);
    assert_graph_shape(&decoded);
    assert!(decoded.enable_drop_shadows);
    assert_eq!(decoded.scenes[1].entries[1].layer, 3);
    assert!(decoded.scenes[1].entries[0].shadow_model.is_some());

    let (second, slots2) = decoded.write().unwrap();
    let motion_second = sa2event::motion::write_motion_table(&slots2, &decoded.pool).unwrap();
    assert_eq!(first, second);
    assert_eq!(motion_first, motion_second);
}

#[test]
fn gc_requires_the_motion_buffer() {
    let model = build_model(Platform::Gc);
    let (data, _) = model.write().unwrap();

    let err = ModelData::read(&data, None).unwrap_err();
    assert!(matches!(err, EventError::MissingMotionBuffer(Platform::Gc)));
}

#[test]
fn model_queries_track_animations() {
    let model = build_model(Platform::Dc);

    let models = model.models(true);
    // hero, rival, big, upgrade model
    assert_eq!(models.len(), 4);
    assert_eq!(model.models(false).len(), 3);

    let idle = model.non_animated_models(true);
    // hero, rival and big are animated somewhere, the upgrade model is not
    assert_eq!(idle.len(), 1);
    assert!(!idle.contains(&model.scenes[0].entries[0].model.unwrap()));
}
