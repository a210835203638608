use glam::DVec2;

const HASH_AXIS: DVec2 = DVec2::new(12.9898, 78.233);
const HASH_SCALE: f64 = 43758.5453123;

/// Maps an integer lattice cell to a pseudo-random value in `[0, 1)`.
pub fn hash(cell: DVec2) -> f64 {
    fract((cell.dot(HASH_AXIS)).sin() * HASH_SCALE)
}

/// Value noise: hashed lattice corners blended with a `3u² - 2u³` curve.
pub fn value_noise(st: DVec2) -> f64 {
    let cell = st.floor();
    let f = st - cell;

    let a = hash(cell);
    let b = hash(cell + DVec2::new(1.0, 0.0));
    let c = hash(cell + DVec2::new(0.0, 1.0));
    let d = hash(cell + DVec2::new(1.0, 1.0));

    let u = f * f * (DVec2::splat(3.0) - 2.0 * f);
    mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y
}

/// GLSL `fract`: always in `[0, 1)` for finite input.
pub(crate) fn fract(value: f64) -> f64 {
    let f = value - value.floor();
    // `x - floor(x)` rounds up to 1.0 for tiny negative x.
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

pub(crate) fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
