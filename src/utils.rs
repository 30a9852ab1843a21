use glam::Vec3;
use wgpu::util::DeviceExt;
use bytemuck::NoUninit;

use std::collections::BTreeSet;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// CPU-side mesh. All entity meshes are line lists (the whole game renders
/// as wireframe); the starfield reuses the same layout as a point list.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }

    fn push_vertex(&mut self, pos: Vec3, color: [f32; 4]) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            pos: pos.to_array(),
            color,
        });
        idx
    }

    fn push_line(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        let ia = self.push_vertex(a, color);
        let ib = self.push_vertex(b, color);
        self.indices.push(ia);
        self.indices.push(ib);
    }

    /// Closed loop of `segments` line segments around `center`, spanned by
    /// the two (unit) basis vectors.
    fn push_ring(&mut self, center: Vec3, u: Vec3, v: Vec3, radius: f32, segments: u32, color: [f32; 4]) {
        let first = self.vertices.len() as u32;
        for i in 0..segments {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let pos = center + (u * angle.cos() + v * angle.sin()) * radius;
            self.push_vertex(pos, color);
        }
        for i in 0..segments {
            self.indices.push(first + i);
            self.indices.push(first + (i + 1) % segments);
        }
    }

    fn push_box_edges(&mut self, center: Vec3, half: Vec3, color: [f32; 4]) {
        let first = self.vertices.len() as u32;
        for &z in &[-half.z, half.z] {
            for &y in &[-half.y, half.y] {
                for &x in &[-half.x, half.x] {
                    self.push_vertex(center + Vec3::new(x, y, z), color);
                }
            }
        }
        // corners are ordered x fastest, then y, then z
        const EDGES: [(u32, u32); 12] = [
            (0, 1), (2, 3), (4, 5), (6, 7), // along x
            (0, 2), (1, 3), (4, 6), (5, 7), // along y
            (0, 4), (1, 5), (2, 6), (3, 7), // along z
        ];
        for (a, b) in EDGES {
            self.indices.push(first + a);
            self.indices.push(first + b);
        }
    }
}

const HULL_GRAY: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
const CANNON_RED: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
const LASER_RED: [f32; 4] = [1.0, 0.1, 0.1, 1.0];
const ROCK_GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
const STAR_WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Player ship: a fuselage tube along Z, a wing box, and a cannon pod on
/// each wingtip (where the lasers spawn from).
pub fn create_ship_mesh() -> Mesh {
    let mut mesh = Mesh::empty();

    // fuselage: two rings joined by longerons
    let segments = 8;
    let nose = Vec3::new(0.0, 0.0, -2.0);
    let tail = Vec3::new(0.0, 0.0, 2.0);
    mesh.push_ring(nose, Vec3::X, Vec3::Y, 0.5, segments, HULL_GRAY);
    mesh.push_ring(tail, Vec3::X, Vec3::Y, 0.5, segments, HULL_GRAY);
    for i in 0..4 {
        let angle = i as f32 / 4.0 * std::f32::consts::TAU;
        let rim = Vec3::new(angle.cos(), angle.sin(), 0.0) * 0.5;
        mesh.push_line(nose + rim, tail + rim, HULL_GRAY);
    }

    // wings
    mesh.push_box_edges(Vec3::new(0.0, 0.2, 0.0), Vec3::new(3.0, 0.05, 0.5), HULL_GRAY);

    // wingtip cannons
    for mount in crate::model::CANNON_MOUNTS {
        mesh.push_ring(mount, Vec3::X, Vec3::Y, 0.1, 6, CANNON_RED);
        mesh.push_line(
            mount + Vec3::new(0.0, 0.0, -0.25),
            mount + Vec3::new(0.0, 0.0, 0.25),
            CANNON_RED,
        );
    }

    mesh
}

/// Laser bolt: a thin 2-unit tube along +Y (swung onto the travel direction
/// by the bolt's transform).
pub fn create_laser_mesh() -> Mesh {
    let mut mesh = Mesh::empty();
    for offset in [
        Vec3::new(0.05, 0.0, 0.0),
        Vec3::new(-0.05, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.05),
        Vec3::new(0.0, 0.0, -0.05),
    ] {
        mesh.push_line(
            offset + Vec3::new(0.0, -1.0, 0.0),
            offset + Vec3::new(0.0, 1.0, 0.0),
            LASER_RED,
        );
    }
    mesh
}

/// Turret: tapered base, spherical head, barrel out along +Z (the tracking
/// yaw swings the whole emplacement).
pub fn create_turret_mesh() -> Mesh {
    let mut mesh = Mesh::empty();
    let segments = 8;

    let base = [0.4, 0.4, 0.4, 1.0];
    let head = [0.27, 0.27, 0.27, 1.0];
    let barrel = [0.2, 0.2, 0.2, 1.0];

    // tapered base drum
    mesh.push_ring(Vec3::new(0.0, -0.5, 0.0), Vec3::X, Vec3::Z, 1.2, segments, base);
    mesh.push_ring(Vec3::new(0.0, 0.5, 0.0), Vec3::X, Vec3::Z, 1.0, segments, base);
    for i in 0..4 {
        let angle = i as f32 / 4.0 * std::f32::consts::TAU;
        let spoke = Vec3::new(angle.cos(), 0.0, angle.sin());
        mesh.push_line(
            Vec3::new(0.0, -0.5, 0.0) + spoke * 1.2,
            Vec3::new(0.0, 0.5, 0.0) + spoke * 1.0,
            base,
        );
    }

    // head: three orthogonal rings approximate the sphere
    let head_center = Vec3::new(0.0, 1.0, 0.0);
    mesh.push_ring(head_center, Vec3::X, Vec3::Z, 0.8, segments, head);
    mesh.push_ring(head_center, Vec3::X, Vec3::Y, 0.8, segments, head);
    mesh.push_ring(head_center, Vec3::Z, Vec3::Y, 0.8, segments, head);

    // barrel
    for offset in [
        Vec3::new(0.2, 0.0, 0.0),
        Vec3::new(-0.2, 0.0, 0.0),
        Vec3::new(0.0, 0.2, 0.0),
        Vec3::new(0.0, -0.2, 0.0),
    ] {
        mesh.push_line(
            head_center + offset,
            head_center + offset + Vec3::new(0.0, 0.0, 2.0),
            barrel,
        );
    }
    mesh.push_ring(head_center + Vec3::new(0.0, 0.0, 2.0), Vec3::X, Vec3::Y, 0.2, 6, barrel);

    mesh
}

/// Unit-radius rock: an icosahedron with every vertex jittered outward or
/// inward so no two asteroids look alike. Scaled to size by the entity
/// transform.
pub fn create_asteroid_mesh(rng: &mut Xorshift32) -> Mesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    const FACES: [(u32, u32, u32); 20] = [
        (0, 11, 5), (0, 5, 1), (0, 1, 7), (0, 7, 10), (0, 10, 11),
        (1, 5, 9), (5, 11, 4), (11, 10, 2), (10, 7, 6), (7, 1, 8),
        (3, 9, 4), (3, 4, 2), (3, 2, 6), (3, 6, 8), (3, 8, 9),
        (4, 9, 5), (2, 4, 11), (6, 2, 10), (8, 6, 7), (9, 8, 1),
    ];

    let mut mesh = Mesh::empty();
    for corner in corners {
        let jitter = 0.8 + 0.4 * rng.next_f32();
        mesh.push_vertex(corner.normalize() * jitter, ROCK_GRAY);
    }

    let mut edges = BTreeSet::new();
    for (a, b, c) in FACES {
        for (lo, hi) in [(a.min(b), a.max(b)), (b.min(c), b.max(c)), (a.min(c), a.max(c))] {
            edges.insert((lo, hi));
        }
    }
    for (a, b) in edges {
        mesh.indices.push(a);
        mesh.indices.push(b);
    }
    mesh
}

/// Random point cloud filling the play volume, drawn as a point list.
pub fn create_starfield_mesh(rng: &mut Xorshift32, count: u32, extent: f32) -> Mesh {
    let mut mesh = Mesh::empty();
    for i in 0..count {
        mesh.push_vertex(
            Vec3::new(
                rng.range(-extent, extent),
                rng.range(-extent, extent),
                rng.range(-extent, extent),
            ),
            STAR_WHITE,
        );
        mesh.indices.push(i);
    }
    mesh
}

/// Xorshift32 PRNG: tiny, seedable, identical on native and wasm.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        // state must never be zero or the sequence collapses
        let state = if seed == 0 { 0xBADC0FFE } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = Xorshift32::new(1234);
        let mut b = Xorshift32::new(1234);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        let mut c = Xorshift32::new(4321);
        assert_ne!(a.next_u32(), c.next_u32());
    }

    #[test]
    fn rng_floats_stay_in_range() {
        let mut rng = Xorshift32::new(42);
        for _ in 0..1000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f));
            let r = rng.range(-3.0, 7.0);
            assert!((-3.0..7.0).contains(&r));
        }
    }

    fn assert_valid_line_mesh(mesh: &Mesh) {
        assert!(!mesh.vertices.is_empty());
        assert_eq!(mesh.indices.len() % 2, 0, "line list needs index pairs");
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn entity_meshes_are_well_formed() {
        assert_valid_line_mesh(&create_ship_mesh());
        assert_valid_line_mesh(&create_laser_mesh());
        assert_valid_line_mesh(&create_turret_mesh());
        let mut rng = Xorshift32::new(9);
        assert_valid_line_mesh(&create_asteroid_mesh(&mut rng));
    }

    #[test]
    fn asteroid_has_icosahedron_topology_with_jittered_radius() {
        let mut rng = Xorshift32::new(9);
        let mesh = create_asteroid_mesh(&mut rng);
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 30 * 2);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.pos).length();
            assert!((0.79..=1.21).contains(&r));
        }
    }

    #[test]
    fn starfield_fills_the_volume() {
        let mut rng = Xorshift32::new(11);
        let mesh = create_starfield_mesh(&mut rng, 1000, 1000.0);
        assert_eq!(mesh.vertices.len(), 1000);
        assert_eq!(mesh.indices.len(), 1000);
        for v in &mesh.vertices {
            assert!(v.pos.iter().all(|c| c.abs() <= 1000.0));
        }
    }
}
