use crate::error::Result;

/// Unit the temperature is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Converts a Celsius value into this unit
    pub fn from_celsius(&self, celsius: f32) -> f32 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * (9. / 5.) + 32.,
        }
    }

    /// Unit letter shown after the degree glyph
    pub fn symbol(&self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }
}

/// One raw conversion from an ADC channel.
///
/// Implementations block until the conversion-complete flag is set.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16>;
}

/// Anything that yields a temperature once per supervisory cycle
pub trait TemperatureSensor {
    fn read(&mut self, unit: TemperatureUnit) -> Result<f32>;
}

/// LM35 analog temperature sensor: 10mV per degree Celsius
pub struct Lm35<A> {
    adc: A,
    vref_mv: u32,
    full_scale: u32,
}

impl<A: AnalogInput> Lm35<A> {
    /// `vref_mv` is the ADC reference, `full_scale` the largest raw code
    /// (1023 for 10 bits, 4095 for 12 bits)
    pub fn new(adc: A, vref_mv: u32, full_scale: u32) -> Self {
        Self {
            adc,
            vref_mv,
            full_scale,
        }
    }

    /// Gets temperature in Celsius from a raw sample
    pub fn celsius_from_raw(&self, raw: u16) -> f32 {
        let millivolts = raw as f32 * self.vref_mv as f32 / self.full_scale as f32;
        millivolts / 10.
    }
}

impl<A: AnalogInput> TemperatureSensor for Lm35<A> {
    fn read(&mut self, unit: TemperatureUnit) -> Result<f32> {
        let raw = self.adc.read_raw()?;
        let celsius = self.celsius_from_raw(raw);
        trace!("lm35 raw {=u16}", raw);
        Ok(unit.from_celsius(celsius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedAdc(Option<u16>);

    impl AnalogInput for FixedAdc {
        fn read_raw(&mut self) -> Result<u16> {
            self.0.ok_or(Error::Sensor)
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b) < 0.01 && (b - a) < 0.01
    }

    #[test]
    fn converts_raw_to_celsius() {
        // 12 bit, 3.3V: 0.5V → 50 °C
        let lm35 = Lm35::new(FixedAdc(None), 3300, 4095);
        assert!(close(lm35.celsius_from_raw(0), 0.0));
        assert!(close(lm35.celsius_from_raw(4095), 330.0));
        assert!(close(lm35.celsius_from_raw(620), 49.96));
    }

    #[test]
    fn reads_in_requested_unit() {
        let mut lm35 = Lm35::new(FixedAdc(Some(100)), 1000, 1000);
        assert!(close(lm35.read(TemperatureUnit::Celsius).unwrap(), 10.0));
        assert!(close(lm35.read(TemperatureUnit::Fahrenheit).unwrap(), 50.0));
    }

    #[test]
    fn sample_fault_propagates() {
        let mut lm35 = Lm35::new(FixedAdc(None), 3300, 1023);
        assert_eq!(lm35.read(TemperatureUnit::Celsius), Err(Error::Sensor));
    }

    #[test]
    fn unit_symbols() {
        assert_eq!(TemperatureUnit::Celsius.symbol(), 'C');
        assert_eq!(TemperatureUnit::Fahrenheit.symbol(), 'F');
    }
}
