#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InertialChannel {
    /// Gyroscope, rad/s.
    AngularRate,
    /// Accelerometer, m/s^2.
    LinearAcceleration,
}

/// Six-axis sample stamped with the hardware time of the event that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialSample {
    pub t_ns: i64,
    pub gyro: [f32; 3],
    pub accel: [f32; 3],
}

impl InertialSample {
    /// `t_ns,wx,wy,wz,ax,ay,az` row for `imu0/data.csv`.
    pub fn csv_line(&self) -> String {
        let w = self.gyro;
        let a = self.accel;
        format!(
            "{},{},{},{},{},{},{}\n",
            self.t_ns, w[0], w[1], w[2], a[0], a[1], a[2]
        )
    }
}

/// Hold-last fusion of the two inertial channels. No interpolation: a sample
/// may pair a fresh reading from one channel with a stale one from the other.
#[derive(Debug, Clone, Default)]
pub struct SensorSampler {
    gyro: [f32; 3],
    accel: [f32; 3],
}

impl SensorSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(&mut self, channel: InertialChannel, values: [f32; 3], t_ns: i64) -> InertialSample {
        match channel {
            InertialChannel::AngularRate => self.gyro = values,
            InertialChannel::LinearAcceleration => self.accel = values,
        }
        InertialSample {
            t_ns,
            gyro: self.gyro,
            accel: self.accel,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
