//! Renders a procedural ball-and-stick helix through the post-processing
//! stack and writes the color, shadow, and edge outputs as PPM images.
//!
//! Usage: `viso-postfx [preset.toml] [output-dir]`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use viso_postfx::camera::CameraProjection;
use viso_postfx::lighting::{LightDescriptor, LightSet};
use viso_postfx::options::Options;
use viso_postfx::renderer::postprocess::{
    FrameContext, FrameOutput, PostProcessStack, SceneRenderer,
};
use viso_postfx::texture::depth::{DepthBuffer, DepthEncoding, SceneDepth};
use viso_postfx::texture::{ColorBuffer, TextureBuffer};
use viso_postfx::util::screen_space::{project_to_screen, reconstruct_view_position};
use viso_postfx::PostFxError;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

const ATOM_RADIUS: f32 = 0.7;
const BOND_RADIUS: f32 = 0.22;
const BOND_BEADS: usize = 6;

/// CPK-ish palette cycled along the chain (C, N, C, O).
const PALETTE: [Vec3; 4] = [
    Vec3::new(0.55, 0.57, 0.6),
    Vec3::new(0.25, 0.4, 0.9),
    Vec3::new(0.55, 0.57, 0.6),
    Vec3::new(0.9, 0.2, 0.2),
];

#[derive(Clone, Copy)]
struct Sphere {
    center: Vec3,
    radius: f32,
    color: Vec3,
}

/// Ray-casts a helix of atoms joined by bead-chain bonds, in view space.
struct HelixScene {
    spheres: Vec<Sphere>,
    light: Vec3,
}

impl HelixScene {
    fn new(center: Vec3, light: Vec3) -> Self {
        let atoms: Vec<Sphere> = (0..28)
            .map(|i| {
                let t = i as f32 * 0.55;
                Sphere {
                    center: center
                        + Vec3::new(4.0 * t.cos(), i as f32 * 0.45 - 6.0, 4.0 * t.sin()),
                    radius: ATOM_RADIUS,
                    color: PALETTE[i % PALETTE.len()],
                }
            })
            .collect();
        let mut spheres = atoms.clone();
        for pair in atoms.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            for k in 1..BOND_BEADS {
                let s = k as f32 / BOND_BEADS as f32;
                spheres.push(Sphere {
                    center: a.center.lerp(b.center, s),
                    radius: BOND_RADIUS,
                    color: if s < 0.5 { a.color } else { b.color },
                });
            }
        }
        // A floor slab behind the helix to catch shadows.
        spheres.push(Sphere {
            center: center + Vec3::new(0.0, 0.0, -1010.0),
            radius: 1000.0,
            color: Vec3::splat(0.8),
        });
        Self {
            spheres,
            light: light.normalize(),
        }
    }

    /// Nearest hit along the pixel ray: shaded color and view position.
    fn trace(&self, origin: Vec3, dir: Vec3) -> Option<(Vec3, Vec3)> {
        let mut best: Option<(f32, &Sphere)> = None;
        for s in &self.spheres {
            let oc = origin - s.center;
            let b = oc.dot(dir);
            let c = oc.length_squared() - s.radius * s.radius;
            let disc = b * b - c;
            if disc < 0.0 {
                continue;
            }
            let t = -b - disc.sqrt();
            if t > 0.0 && !matches!(best, Some((bt, _)) if bt <= t) {
                best = Some((t, s));
            }
        }
        best.map(|(t, s)| {
            let p = origin + dir * t;
            let n = (p - s.center).normalize();
            let diffuse = n.dot(-self.light).max(0.0);
            (s.color * (0.25 + 0.75 * diffuse), p)
        })
    }
}

impl SceneRenderer for HelixScene {
    fn draw(
        &mut self,
        target: &mut ColorBuffer,
        camera: &CameraProjection,
        depth_encoding: DepthEncoding,
    ) -> Result<SceneDepth, PostFxError> {
        let (w, h) = target.size();
        let tex_size = target.tex_size();
        let inv = camera.inverse_projection();
        let proj = camera.projection();
        let mut hits = TextureBuffer::new(w, h, None);
        hits.shade_parallel(|frag: Vec2| {
            let uv = frag / tex_size;
            let near = reconstruct_view_position(uv, 0.0, &inv);
            let far = reconstruct_view_position(uv, 1.0, &inv);
            self.trace(near, (far - near).normalize())
                .map(|(color, p)| (color, project_to_screen(p, &proj).z))
        });

        let mut depths = TextureBuffer::new(w, h, 1.0_f32);
        for y in 0..h {
            for x in 0..w {
                if let Some((color, depth)) = hits.texel(i64::from(x), i64::from(y)) {
                    target.set(x, y, color.extend(1.0));
                    depths.set(x, y, depth.clamp(0.0, 1.0));
                }
            }
        }
        Ok(SceneDepth::opaque(DepthBuffer::encode(&depths, depth_encoding)))
    }
}

fn write_ppm(
    path: &Path,
    w: u32,
    h: u32,
    rgb: impl Fn(u32, u32) -> Vec3,
) -> Result<(), PostFxError> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{w} {h}\n255\n")?;
    // PPM rows run top to bottom.
    for y in (0..h).rev() {
        for x in 0..w {
            let c = (rgb(x, y).clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            out.write_all(&[c.x as u8, c.y as u8, c.z as u8])?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_outputs(dir: &Path, output: &FrameOutput) -> Result<(), PostFxError> {
    std::fs::create_dir_all(dir)?;
    let (w, h) = output.color.size();
    let at = |x: u32, y: u32| (i64::from(x), i64::from(y));

    write_ppm(&dir.join("color.ppm"), w, h, |x, y| {
        let (x, y) = at(x, y);
        output.color.texel(x, y).truncate()
    })?;
    if let Some(mask) = &output.shadows {
        write_ppm(&dir.join("shadows.ppm"), w, h, |x, y| {
            let (x, y) = at(x, y);
            Vec3::splat(mask.texel(x, y))
        })?;
    }
    if let Some(edges) = &output.edges {
        write_ppm(&dir.join("edges.ppm"), w, h, |x, y| {
            let (x, y) = at(x, y);
            edges.texel(x, y).extend(0.0)
        })?;
    }
    log::info!("wrote frame outputs to {}", dir.display());
    Ok(())
}

fn run(preset: Option<PathBuf>, out_dir: &Path) -> Result<(), PostFxError> {
    let options = match preset {
        Some(path) => {
            log::info!("loading preset {}", path.display());
            Options::load(&path)?
        }
        None => {
            let mut options = Options::default();
            options.shadows.enabled = true;
            options
        }
    };

    let camera =
        CameraProjection::from_options(&options.camera, WIDTH as f32 / HEIGHT as f32)?;
    let mut stack = PostProcessStack::new(options, WIDTH, HEIGHT)?;

    let light = Vec3::new(0.4, -0.6, -0.7);
    let mut frame = FrameContext::new(camera, WIDTH, HEIGHT);
    frame.lights = LightSet::from_slice(&[LightDescriptor::new(light, Vec3::ONE)])?;
    frame.focus_center = Some(Vec3::new(0.0, 0.0, -40.0));

    let mut scene = HelixScene::new(Vec3::new(0.0, 0.0, -40.0), light);
    let output = stack.render_frame(&frame, &mut scene)?;
    log::info!(
        "frame done in {:.2} ms (background {:?}, scene {:?}, shadows {:?}, \
         dof {:?}, edges {:?})",
        output.timings.total().as_secs_f32() * 1000.0,
        output.timings.background,
        output.timings.scene,
        output.timings.shadows,
        output.timings.depth_of_field,
        output.timings.edges,
    );
    write_outputs(out_dir, &output)
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let mut args = std::env::args().skip(1);
    let preset = args.next().map(PathBuf::from);
    let out_dir = args.next().map_or_else(|| PathBuf::from("out"), PathBuf::from);

    if let Err(e) = run(preset, &out_dir) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
