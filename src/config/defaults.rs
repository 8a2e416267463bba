//! Default value functions for serde deserialization.

pub fn particles_number() -> usize {
    500
}

pub fn max_draw_attempts_per_particle() -> usize {
    1000
}

pub fn rot_noise_coeffs() -> [f32; 2] {
    [0.1, 0.05]
}

pub fn trans_noise_coeffs() -> [f32; 2] {
    [0.1, 0.05]
}

pub fn sigma_hit() -> f32 {
    0.2
}

pub fn weight_hit() -> f32 {
    0.9
}

pub fn weight_random() -> f32 {
    0.1
}

pub fn beam_skip() -> usize {
    1
}

pub fn theta_bin_size() -> f32 {
    std::f32::consts::PI / 6.0
}
