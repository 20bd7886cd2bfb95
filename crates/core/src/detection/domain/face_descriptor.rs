/// Distance below which two descriptors are treated as the same person.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

pub const DESCRIPTOR_LEN: usize = 128;

/// 128-dimensional identity embedding from the recognition net.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceDescriptor {
    values: Vec<f32>,
}

impl FaceDescriptor {
    pub fn new(values: Vec<f32>) -> Result<Self, String> {
        if values.len() != DESCRIPTOR_LEN {
            return Err(format!(
                "expected {DESCRIPTOR_LEN}-float descriptor, got {}",
                values.len()
            ));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn distance(&self, other: &FaceDescriptor) -> f32 {
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    pub fn matches(&self, other: &FaceDescriptor, threshold: f32) -> bool {
        self.distance(other) < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn descriptor(fill: f32) -> FaceDescriptor {
        FaceDescriptor::new(vec![fill; DESCRIPTOR_LEN]).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let d = descriptor(0.3);
        assert_relative_eq!(d.distance(&d), 0.0);
        assert!(d.matches(&d, DEFAULT_MATCH_THRESHOLD));
    }

    #[test]
    fn test_distance_is_euclidean() {
        // sqrt(128 * 0.1^2)
        let expected = (128.0f32 * 0.01).sqrt();
        assert_relative_eq!(descriptor(0.0).distance(&descriptor(0.1)), expected, epsilon = 1e-5);
        assert!(!descriptor(0.0).matches(&descriptor(0.1), DEFAULT_MATCH_THRESHOLD));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(FaceDescriptor::new(vec![0.0; 64]).is_err());
    }
}
