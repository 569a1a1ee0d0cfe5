pub mod barrier;
pub mod buzzer;
pub mod nvs;
pub mod presence;
pub mod sntp;
pub mod status_led;
pub mod switch;
pub mod ultrasonic;
pub mod wifi;
