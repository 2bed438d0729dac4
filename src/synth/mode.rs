/// A tuning mode: an ordered ratio ladder with display labels. Mode files
/// and network fetch live upstream; ratios arrive here already parsed.
#[derive(Debug, Clone)]
pub struct Mode {
    pub name: String,
    pub ratios: Vec<f64>,
    pub labels: Vec<String>,
}

impl Mode {
    pub fn new(name: impl Into<String>, ratios: Vec<f64>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ratios,
            labels,
        }
    }

    /// Frequency for key `index`, folding up an octave each time the ladder
    /// wraps: `base * ratio[i mod n] * 2^(i div n)`.
    pub fn key_frequency(&self, base_freq: f32, index: usize) -> f32 {
        if self.ratios.is_empty() {
            return base_freq;
        }
        let n = self.ratios.len();
        let ratio = self.ratios[index % n];
        let octave = (index / n) as i32;
        (f64::from(base_freq) * ratio * 2.0f64.powi(octave)) as f32
    }

    pub fn label(&self, index: usize) -> &str {
        if self.labels.is_empty() {
            return "?";
        }
        &self.labels[index % self.labels.len()]
    }

    /// N-step equal temperament.
    pub fn equal_temperament(steps: usize) -> Self {
        let steps = steps.max(1);
        let mut ratios = Vec::with_capacity(steps);
        let mut labels = Vec::with_capacity(steps);
        for k in 0..steps {
            ratios.push(2.0f64.powf(k as f64 / steps as f64));
            labels.push(format!("Step {k}/{steps}"));
        }
        Self::new(format!("Equal Temperament {steps}"), ratios, labels)
    }

    /// Five-note just ladder used as the demo default.
    pub fn just_example() -> Self {
        Self::new(
            "Just Example",
            vec![12.0 / 12.0, 12.0 / 11.0, 12.0 / 10.0, 12.0 / 9.0, 12.0 / 8.0],
            vec![
                "C 12/12".into(),
                "D 11/12".into(),
                "E 10/12".into(),
                "F 9/12".into(),
                "G 8/12".into(),
            ],
        )
    }
}
