//! Bosch BME280 humidity sensor over I²C.
//!
//! Only temperature and humidity are compensated; humidity compensation
//! needs the fine temperature (`t_fine`).  Pressure is sampled by the
//! chip but ignored.
//!
//! The sensor runs in normal mode (oversampling x1 everywhere, 1 s
//! standby), so a read is a single burst of the data registers with no
//! conversion wait.

use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use crate::app::ports::HumidityPort;
use crate::error::SensorError;

const CHIP_ID: u8 = 0x60;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_T: u8 = 0x88;
const REG_CALIB_H1: u8 = 0xA1;
const REG_CALIB_H2: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_DATA: u8 = 0xF7;

/// osrs_h = x1.  Only latched by the next ctrl_meas write.
const CTRL_HUM_X1: u8 = 0x01;
/// osrs_t = x1, osrs_p = x1, mode = normal.
const CTRL_MEAS_NORMAL_X1: u8 = 0x27;
/// t_sb = 1000 ms, filter off.
const CONFIG_STANDBY_1S: u8 = 0xA0;

/// Factory trimming parameters for temperature and humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Decode the 0x88.. temperature block, H1 and the 0xE1..0xE7 block.
    pub fn from_registers(t: &[u8; 6], h1: u8, h: &[u8; 7]) -> Self {
        Self {
            t1: u16::from_le_bytes([t[0], t[1]]),
            t2: i16::from_le_bytes([t[2], t[3]]),
            t3: i16::from_le_bytes([t[4], t[5]]),
            h1,
            h2: i16::from_le_bytes([h[0], h[1]]),
            h3: h[2],
            // H4 and H5 are 12-bit values sharing the nibbles of 0xE5.
            h4: (i16::from(h[3] as i8) << 4) | i16::from(h[4] & 0x0F),
            h5: (i16::from(h[5] as i8) << 4) | i16::from(h[4] >> 4),
            h6: h[6] as i8,
        }
    }

    /// Returns `(t_fine, temperature in 0.01 °C)`.
    pub fn compensate_temperature(&self, adc_t: i32) -> (i32, i32) {
        let adc_t = i64::from(adc_t);
        let t1 = i64::from(self.t1);
        let var1 = (((adc_t >> 3) - (t1 << 1)) * i64::from(self.t2)) >> 11;
        let var2 = ((((adc_t >> 4) - t1) * ((adc_t >> 4) - t1)) >> 12) * i64::from(self.t3) >> 14;
        let t_fine = var1 + var2;
        (t_fine as i32, ((t_fine * 5 + 128) >> 8) as i32)
    }

    /// Relative humidity in Q22.10 %RH.
    pub fn compensate_humidity(&self, adc_h: i32, t_fine: i32) -> u32 {
        let v = i64::from(t_fine) - 76_800;
        let adc_h = i64::from(adc_h);
        let (h1, h2, h3) = (i64::from(self.h1), i64::from(self.h2), i64::from(self.h3));
        let (h4, h5, h6) = (i64::from(self.h4), i64::from(self.h5), i64::from(self.h6));

        let mut x = (((adc_h << 14) - (h4 << 20) - (h5 * v)) + 16_384) >> 15;
        x *= (((((v * h6) >> 10) * (((v * h3) >> 11) + 32_768)) >> 10) + 2_097_152) * h2 + 8_192
            >> 14;
        x -= ((((x >> 15) * (x >> 15)) >> 7) * h1) >> 4;
        (x.clamp(0, 419_430_400) >> 12) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bme280Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Bme280<I2C> {
    i2c: I2C,
    address: u8,
    cal: Option<Calibration>,
}

impl<I2C: I2c> Bme280<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            cal: None,
        }
    }

    /// Probe the chip id, read calibration and start normal mode.
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_CHIP_ID], &mut id)
            .map_err(|_| SensorError::NotPresent)?;
        if id[0] != CHIP_ID {
            warn!("BME280: unexpected chip id 0x{:02x}", id[0]);
            return Err(SensorError::BadChipId(id[0]));
        }

        let mut t = [0u8; 6];
        let mut h1 = [0u8; 1];
        let mut h = [0u8; 7];
        self.read_regs(REG_CALIB_T, &mut t)?;
        self.read_regs(REG_CALIB_H1, &mut h1)?;
        self.read_regs(REG_CALIB_H2, &mut h)?;
        let cal = Calibration::from_registers(&t, h1[0], &h);
        debug!("BME280 calibration: {:?}", cal);

        self.write_reg(REG_CTRL_HUM, CTRL_HUM_X1)?;
        self.write_reg(REG_CONFIG, CONFIG_STANDBY_1S)?;
        self.write_reg(REG_CTRL_MEAS, CTRL_MEAS_NORMAL_X1)?;

        self.cal = Some(cal);
        info!("BME280 ready at 0x{:02x}", self.address);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.cal.is_some()
    }

    /// Burst-read the latest conversion.
    pub fn measure(&mut self) -> Result<Bme280Reading, SensorError> {
        let cal = self.cal.ok_or(SensorError::NotPresent)?;
        let mut data = [0u8; 8];
        self.read_regs(REG_DATA, &mut data)?;

        let adc_t = (i32::from(data[3]) << 12) | (i32::from(data[4]) << 4) | (i32::from(data[5]) >> 4);
        let adc_h = (i32::from(data[6]) << 8) | i32::from(data[7]);

        let (t_fine, centi_c) = cal.compensate_temperature(adc_t);
        let humidity = cal.compensate_humidity(adc_h, t_fine);
        Ok(Bme280Reading {
            temperature_c: centi_c as f32 / 100.0,
            humidity_pct: humidity as f32 / 1024.0,
        })
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::Bus)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }
}

impl<I2C: I2c> HumidityPort for Bme280<I2C> {
    /// Initialises lazily, so a sensor plugged in (or recovered) after
    /// boot is picked up on the next sample.
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        if !self.is_ready() {
            self.init()?;
        }
        self.measure().map(|r| r.humidity_pct)
    }
}
