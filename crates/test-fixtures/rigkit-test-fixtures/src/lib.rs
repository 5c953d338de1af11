//! Canned skeletons and scene helpers shared by the rigkit test suites.
//!
//! Every fixture returns a fresh [`MemoryScene`] with the joints already
//! loaded, plus the joint ids in chain order. Positions are plausible
//! biped proportions for a character standing at the origin, +y up, +z
//! forward, left side at +x.

use rigkit_api_core::Vec3;
use rigkit_scene_core::{load_skeleton, MemoryScene, NodeId, SkeletonSpec};

/// Left arm: clavicle -> shoulder -> elbow -> wrist. The elbow is bent
/// slightly back so pole-vector placement has a plane to work with.
pub const ARM_JSON: &str = r#"{
    "joints": [
        { "name": "hero_bind_clavicle_l_jnt", "position": [0.5, 14.0, 0.0] },
        { "name": "hero_bind_shoulder_l_jnt", "parent": "hero_bind_clavicle_l_jnt", "position": [1.5, 14.0, 0.0] },
        { "name": "hero_bind_elbow_l_jnt", "parent": "hero_bind_shoulder_l_jnt", "position": [4.0, 14.0, -0.6] },
        { "name": "hero_bind_wrist_l_jnt", "parent": "hero_bind_elbow_l_jnt", "position": [6.5, 14.0, 0.0] }
    ]
}"#;

/// Left leg with foot: hip -> knee -> ankle -> ball -> toe. The knee bends
/// forward.
pub const LEG_JSON: &str = r#"{
    "joints": [
        { "name": "hero_bind_hip_l_jnt", "position": [1.0, 9.0, 0.0] },
        { "name": "hero_bind_knee_l_jnt", "parent": "hero_bind_hip_l_jnt", "position": [1.0, 5.0, 0.4] },
        { "name": "hero_bind_ankle_l_jnt", "parent": "hero_bind_knee_l_jnt", "position": [1.0, 1.0, 0.0] },
        { "name": "hero_bind_ball_l_jnt", "parent": "hero_bind_ankle_l_jnt", "position": [1.0, 0.3, 1.2] },
        { "name": "hero_bind_toe_l_jnt", "parent": "hero_bind_ball_l_jnt", "position": [1.0, 0.2, 2.0] }
    ]
}"#;

/// Spine: five joints from pelvis to chest, stacked with a slight forward
/// drift so adjacent segments are never perfectly vertical.
pub const SPINE_JSON: &str = r#"{
    "joints": [
        { "name": "hero_bind_pelvis_c_jnt", "position": [0.0, 10.0, 0.0] },
        { "name": "hero_bind_spine1_c_jnt", "parent": "hero_bind_pelvis_c_jnt", "position": [0.0, 11.0, 0.1] },
        { "name": "hero_bind_spine2_c_jnt", "parent": "hero_bind_spine1_c_jnt", "position": [0.0, 12.0, 0.15] },
        { "name": "hero_bind_spine3_c_jnt", "parent": "hero_bind_spine2_c_jnt", "position": [0.0, 13.0, 0.1] },
        { "name": "hero_bind_chest_c_jnt", "parent": "hero_bind_spine3_c_jnt", "position": [0.0, 14.0, 0.0] }
    ]
}"#;

/// Left hand: wrist root with two two-knuckle fingers.
pub const HAND_JSON: &str = r#"{
    "joints": [
        { "name": "hero_bind_hand_l_jnt", "position": [6.5, 14.0, 0.0] },
        { "name": "hero_bind_index_l_jnt", "parent": "hero_bind_hand_l_jnt", "position": [7.2, 14.0, 0.2] },
        { "name": "hero_bind_index2_l_jnt", "parent": "hero_bind_index_l_jnt", "position": [7.7, 14.0, 0.25] },
        { "name": "hero_bind_index3_l_jnt", "parent": "hero_bind_index2_l_jnt", "position": [8.1, 14.0, 0.25] },
        { "name": "hero_bind_pinky_l_jnt", "parent": "hero_bind_hand_l_jnt", "position": [7.2, 14.0, -0.2] },
        { "name": "hero_bind_pinky2_l_jnt", "parent": "hero_bind_pinky_l_jnt", "position": [7.6, 14.0, -0.25] },
        { "name": "hero_bind_pinky3_l_jnt", "parent": "hero_bind_pinky2_l_jnt", "position": [7.9, 14.0, -0.25] }
    ]
}"#;

fn load(raw: &str) -> (MemoryScene, Vec<NodeId>) {
    let spec = SkeletonSpec::from_json(raw).expect("fixture json parses");
    let mut scene = MemoryScene::new();
    let joints = load_skeleton(&mut scene, &spec).expect("fixture skeleton loads");
    (scene, joints)
}

/// Arm scene; joints are `[clavicle, shoulder, elbow, wrist]`.
pub fn arm_scene() -> (MemoryScene, Vec<NodeId>) {
    load(ARM_JSON)
}

/// Leg scene; joints are `[hip, knee, ankle, ball, toe]`.
pub fn leg_scene() -> (MemoryScene, Vec<NodeId>) {
    load(LEG_JSON)
}

/// Spine scene; joints are `[pelvis, spine1, spine2, spine3, chest]`.
pub fn spine_scene() -> (MemoryScene, Vec<NodeId>) {
    load(SPINE_JSON)
}

/// Hand scene; joints are the wrist root followed by both finger chains.
pub fn hand_scene() -> (MemoryScene, Vec<NodeId>) {
    load(HAND_JSON)
}

/// A small sole vertex cloud for the left foot of [`leg_scene`], scanned
/// the way foot-pivot extraction expects: lowest-y extremes front, back,
/// inside, and outside.
pub fn foot_vertices() -> Vec<Vec3> {
    vec![
        Vec3::new(1.0, 0.0, 2.4),   // toe tip
        Vec3::new(1.0, 0.0, -0.6),  // heel
        Vec3::new(0.6, 0.0, 0.8),   // inside edge
        Vec3::new(1.5, 0.0, 0.8),   // outside edge
        Vec3::new(1.0, 0.1, 1.0),   // mid sole
        Vec3::new(1.1, 0.4, 0.2),   // instep
    ]
}
