// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps the generic `WIDTHxHEIGHT` size onto each provider's vocabulary.

pub use emblem_core::parse_size;

/// Coarse aspect bucket shared by all providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Square,
    Landscape4x3,
    Landscape16x9,
    Portrait3x4,
    Portrait9x16,
}

impl Aspect {
    /// Buckets `size` by width/height ratio. Unparseable sizes are square.
    pub fn of(size: &str) -> Self {
        let Some((w, h)) = parse_size(size) else {
            return Aspect::Square;
        };
        let ratio = f64::from(w) / f64::from(h);
        if ratio >= 1.6 {
            Aspect::Landscape16x9
        } else if ratio >= 1.2 {
            Aspect::Landscape4x3
        } else if ratio <= 1.0 / 1.6 {
            Aspect::Portrait9x16
        } else if ratio <= 1.0 / 1.2 {
            Aspect::Portrait3x4
        } else {
            Aspect::Square
        }
    }
}

/// OpenAI image sizes: one square, one landscape, one portrait.
pub fn openai_size(size: &str) -> &'static str {
    match Aspect::of(size) {
        Aspect::Square => "1024x1024",
        Aspect::Landscape4x3 | Aspect::Landscape16x9 => "1792x1024",
        Aspect::Portrait3x4 | Aspect::Portrait9x16 => "1024x1792",
    }
}

/// Fal `image_size` preset names.
pub fn fal_image_size(size: &str) -> &'static str {
    match Aspect::of(size) {
        Aspect::Square => "square_hd",
        Aspect::Landscape4x3 => "landscape_4_3",
        Aspect::Landscape16x9 => "landscape_16_9",
        Aspect::Portrait3x4 => "portrait_4_3",
        Aspect::Portrait9x16 => "portrait_16_9",
    }
}

/// Replicate `aspect_ratio` strings.
pub fn replicate_aspect_ratio(size: &str) -> &'static str {
    match Aspect::of(size) {
        Aspect::Square => "1:1",
        Aspect::Landscape4x3 => "4:3",
        Aspect::Landscape16x9 => "16:9",
        Aspect::Portrait3x4 => "3:4",
        Aspect::Portrait9x16 => "9:16",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_common_sizes() {
        assert_eq!(Aspect::of("1024x1024"), Aspect::Square);
        assert_eq!(Aspect::of("1792x1024"), Aspect::Landscape16x9);
        assert_eq!(Aspect::of("1024x768"), Aspect::Landscape4x3);
        assert_eq!(Aspect::of("768x1024"), Aspect::Portrait3x4);
        assert_eq!(Aspect::of("1024x1792"), Aspect::Portrait9x16);
        assert_eq!(Aspect::of("garbage"), Aspect::Square);
    }

    #[test]
    fn each_provider_has_its_own_vocabulary() {
        assert_eq!(openai_size("1920x1080"), "1792x1024");
        assert_eq!(openai_size("800x600"), "1792x1024");
        assert_eq!(openai_size("512x512"), "1024x1024");
        assert_eq!(fal_image_size("1920x1080"), "landscape_16_9");
        assert_eq!(fal_image_size("1080x1920"), "portrait_16_9");
        assert_eq!(fal_image_size("600x800"), "portrait_4_3");
        assert_eq!(replicate_aspect_ratio("1080x1920"), "9:16");
        assert_eq!(replicate_aspect_ratio("1024x1024"), "1:1");
    }
}
