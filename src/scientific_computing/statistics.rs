use serde::Serialize;

pub fn mean(data:&[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>()/data.len() as f64)
}

// sample standard deviation (n-1), 0 for a single sample
pub fn sample_std_dev(data:&[f64]) -> Option<f64> {
    let mean = mean(data)?;
    if data.len() < 2 {
        return Some(0.0);
    }
    let n = data.len() as f64;
    let ss:f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
    Some((ss/(n - 1.0)).sqrt())
}

#[derive(Clone,Copy,Debug,Default,PartialEq,Serialize)]
pub struct Summary {
    pub samples:usize,
    pub mean:f64,
    pub std_dev:f64,
    pub min:f64,
    pub max:f64
}

impl Summary {
    // all zeros for no data
    pub fn of(data:&[f64]) -> Self {
        let (Some(mean),Some(std_dev)) = (mean(data),sample_std_dev(data)) else {
            return Self::default();
        };
        Self {
            samples:data.len(),
            mean,
            std_dev,
            min:data.iter().copied().fold(f64::INFINITY, f64::min),
            max:data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    }
}

impl FromIterator<f64> for Summary {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        let data:Vec<f64> = iter.into_iter().collect();
        Self::of(&data)
    }
}
