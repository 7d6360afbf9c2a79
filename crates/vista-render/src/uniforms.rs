//! Typed shader uniform table, resolved once after link.

use crate::driver::{GpuDriver, GpuError, UniformLocation, UniformValue};

const UNIFORM_COUNT: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uniform {
    Model,
    World,
    Camera,
    Projection,
    Tint,
    UseTexture,
    Alpha,
    LightPos,
    ViewPos,
    LightingMode,
    Time,
    IsLight,
}

impl Uniform {
    pub const ALL: [Uniform; UNIFORM_COUNT] = [
        Uniform::Model,
        Uniform::World,
        Uniform::Camera,
        Uniform::Projection,
        Uniform::Tint,
        Uniform::UseTexture,
        Uniform::Alpha,
        Uniform::LightPos,
        Uniform::ViewPos,
        Uniform::LightingMode,
        Uniform::Time,
        Uniform::IsLight,
    ];

    /// Name in the shader source.
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Model => "u_Model",
            Uniform::World => "u_World",
            Uniform::Camera => "u_Camera",
            Uniform::Projection => "u_Projection",
            Uniform::Tint => "u_Tint",
            Uniform::UseTexture => "u_UseTexture",
            Uniform::Alpha => "u_Alpha",
            Uniform::LightPos => "u_LightPos",
            Uniform::ViewPos => "u_ViewPos",
            Uniform::LightingMode => "u_LightingMode",
            Uniform::Time => "u_Time",
            Uniform::IsLight => "u_IsLight",
        }
    }

    /// Transforms are required; without them nothing lands on screen.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Uniform::Model | Uniform::World | Uniform::Camera | Uniform::Projection
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UniformTable {
    locations: [Option<UniformLocation>; UNIFORM_COUNT],
}

impl UniformTable {
    /// Fails on the first missing required uniform. Missing optional ones are
    /// logged and later writes to them are dropped.
    pub fn resolve<D: GpuDriver + ?Sized>(driver: &D) -> Result<Self, GpuError> {
        let mut locations = [None; UNIFORM_COUNT];
        for uniform in Uniform::ALL {
            let location = driver.uniform_location(uniform.name());
            match location {
                Some(_) => {}
                None if uniform.is_required() => {
                    return Err(GpuError::MissingUniform(uniform.name().to_string()));
                }
                None => log::warn!("Shader has no {} uniform, uploads skipped", uniform.name()),
            }
            locations[uniform.index()] = location;
        }
        Ok(Self { locations })
    }

    pub fn location(&self, uniform: Uniform) -> Option<UniformLocation> {
        self.locations[uniform.index()]
    }

    pub fn set<D: GpuDriver + ?Sized>(
        &self,
        driver: &mut D,
        uniform: Uniform,
        value: impl Into<UniformValue>,
    ) {
        if let Some(location) = self.location(uniform) {
            driver.set_uniform(location, value.into());
        }
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(value: glam::Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(value: glam::Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DriverCall, RecordingDriver};

    #[test]
    fn test_index_matches_all_order() {
        for (i, uniform) in Uniform::ALL.iter().enumerate() {
            assert_eq!(uniform.index(), i, "{uniform:?} out of order");
        }
    }

    #[test]
    fn test_resolves_every_uniform() {
        let driver = RecordingDriver::new();
        let table = UniformTable::resolve(&driver).unwrap();
        for uniform in Uniform::ALL {
            assert!(table.location(uniform).is_some(), "{} unresolved", uniform.name());
        }
    }

    #[test]
    fn test_missing_required_uniform_fails() {
        let driver = RecordingDriver::new().without_uniform("u_Projection");
        assert_eq!(
            UniformTable::resolve(&driver),
            Err(GpuError::MissingUniform("u_Projection".to_string()))
        );
    }

    #[test]
    fn test_missing_optional_uniform_is_skipped() {
        let mut driver = RecordingDriver::new().without_uniform("u_Time");
        let table = UniformTable::resolve(&driver).unwrap();
        assert_eq!(table.location(Uniform::Time), None);

        table.set(&mut driver, Uniform::Time, 1.5_f32);
        assert!(driver.calls.is_empty(), "write to absent uniform must be dropped");

        table.set(&mut driver, Uniform::Alpha, 0.5_f32);
        assert!(matches!(
            driver.calls.as_slice(),
            [DriverCall::SetUniform(_, UniformValue::Float(a))] if *a == 0.5
        ));
    }
}
