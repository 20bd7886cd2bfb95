use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    /// Output order of the expression net.
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        };
        f.write_str(name)
    }
}

/// Probability per expression, in [`Expression::ALL`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceExpressions {
    probabilities: [f32; 7],
}

impl FaceExpressions {
    pub fn new(probabilities: [f32; 7]) -> Self {
        Self { probabilities }
    }

    /// Builds from raw net logits via softmax.
    pub fn from_logits(logits: &[f32]) -> Result<Self, String> {
        if logits.len() != Expression::ALL.len() {
            return Err(format!(
                "expected {} expression scores, got {}",
                Expression::ALL.len(),
                logits.len()
            ));
        }
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        let mut probabilities = [0.0; 7];
        for (p, e) in probabilities.iter_mut().zip(&exps) {
            *p = e / sum;
        }
        Ok(Self { probabilities })
    }

    pub fn probability(&self, expression: Expression) -> f32 {
        let idx = Expression::ALL
            .iter()
            .position(|&e| e == expression)
            .unwrap_or(0);
        self.probabilities[idx]
    }

    /// Expressions sorted by descending probability.
    pub fn sorted(&self) -> Vec<(Expression, f32)> {
        let mut pairs: Vec<(Expression, f32)> = Expression::ALL
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }

    pub fn dominant(&self) -> (Expression, f32) {
        self.sorted()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_logits_is_a_distribution() {
        let e = FaceExpressions::from_logits(&[1.0, 2.0, 0.5, -1.0, 0.0, 0.0, 3.0]).unwrap();
        let total: f32 = Expression::ALL.iter().map(|&x| e.probability(x)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-5);
        assert_eq!(e.dominant().0, Expression::Surprised);
    }

    #[test]
    fn test_from_logits_is_stable_for_large_values() {
        let e = FaceExpressions::from_logits(&[1000.0, 999.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(e.probability(Expression::Neutral).is_finite());
        assert_eq!(e.dominant().0, Expression::Neutral);
    }

    #[test]
    fn test_from_logits_rejects_wrong_length() {
        assert!(FaceExpressions::from_logits(&[0.0; 3]).is_err());
    }

    #[test]
    fn test_sorted_is_descending() {
        let e = FaceExpressions::new([0.1, 0.5, 0.0, 0.0, 0.3, 0.1, 0.0]);
        let sorted = e.sorted();
        assert_eq!(sorted[0].0, Expression::Happy);
        assert_eq!(sorted[1].0, Expression::Fearful);
        assert!(sorted.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Expression::Disgusted.to_string(), "disgusted");
    }
}
