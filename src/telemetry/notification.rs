//! Wire notification decoding
//!
//! Maps each bridge notification onto the one cache slot it feeds.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use pilot_shared::{proto, telemetry_notification::Kind, TelemetryNotification};
use tracing::debug;

use super::sample::{EulerAngles, GpsFix, ImuSample, TelemetrySample};

/// Convert a notification into the sample for its channel
///
/// Returns `None` for notifications without a payload and for attitude
/// quaternions too close to zero to normalize.
pub fn sample_from_notification(notification: &TelemetryNotification) -> Option<TelemetrySample> {
    let sample = match notification.kind.as_ref()? {
        Kind::Attitude(q) => TelemetrySample::Attitude(quaternion_to_rpy(q)?),
        Kind::Gps(fix) => TelemetrySample::Gps(GpsFix {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
        }),
        Kind::LocalPosition(p) => TelemetrySample::LocalPosition(Vector3::new(p.x, p.y, p.z)),
        Kind::FlightStatus(raw) => TelemetrySample::FlightStatus((*raw).into()),
        Kind::DisplayMode(raw) => TelemetrySample::DisplayMode((*raw).into()),
        Kind::Imu(imu) => TelemetrySample::Imu(ImuSample {
            linear_acceleration: vector(imu.linear_acceleration.as_ref()),
            angular_velocity: vector(imu.angular_velocity.as_ref()),
        }),
        Kind::Velocity(v) => TelemetrySample::Velocity(vector(Some(v))),
        Kind::Height(h) => TelemetrySample::Height(*h),
    };
    Some(sample)
}

/// Roll/pitch/yaw of a FLU-to-ENU attitude quaternion
pub fn quaternion_to_rpy(q: &proto::Quaternion) -> Option<EulerAngles> {
    let Some(unit) = UnitQuaternion::try_new(Quaternion::new(q.w, q.x, q.y, q.z), f64::EPSILON)
    else {
        debug!("[TELEMETRY] Dropping degenerate attitude quaternion {:?}", q);
        return None;
    };

    let (roll, pitch, yaw) = unit.euler_angles();
    Some(EulerAngles { roll, pitch, yaw })
}

fn vector(v: Option<&proto::Vector3>) -> Vector3<f64> {
    v.map(|v| Vector3::new(v.x, v.y, v.z))
        .unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryChannel;
    use pilot_shared::{DisplayMode, FlightStatus};
    use std::f64::consts::FRAC_PI_2;

    fn notification(kind: Kind) -> TelemetryNotification {
        TelemetryNotification::new(kind)
    }

    #[test]
    fn test_each_kind_feeds_its_own_channel() {
        let cases = [
            (
                Kind::Attitude(proto::Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }),
                TelemetryChannel::Attitude,
            ),
            (
                Kind::Gps(proto::NavSatFix { latitude: 1.0, longitude: 2.0, altitude: 3.0 }),
                TelemetryChannel::Gps,
            ),
            (
                Kind::LocalPosition(proto::Point { x: 1.0, y: 2.0, z: 3.0 }),
                TelemetryChannel::LocalPosition,
            ),
            (Kind::FlightStatus(2), TelemetryChannel::FlightStatus),
            (Kind::DisplayMode(6), TelemetryChannel::DisplayMode),
            (
                Kind::Imu(proto::Imu { linear_acceleration: None, angular_velocity: None }),
                TelemetryChannel::Imu,
            ),
            (
                Kind::Velocity(proto::Vector3 { x: 1.0, y: 0.0, z: 0.0 }),
                TelemetryChannel::Velocity,
            ),
            (Kind::Height(1.5), TelemetryChannel::Height),
        ];

        for (kind, channel) in cases {
            let sample = sample_from_notification(&notification(kind)).expect("sample");
            assert_eq!(sample.channel(), channel);
        }
    }

    #[test]
    fn test_payload_values_are_copied() {
        let sample = sample_from_notification(&notification(Kind::LocalPosition(proto::Point {
            x: 4.0,
            y: -5.0,
            z: 6.5,
        })));
        assert_eq!(sample, Some(TelemetrySample::LocalPosition(Vector3::new(4.0, -5.0, 6.5))));

        let sample = sample_from_notification(&notification(Kind::FlightStatus(1)));
        assert_eq!(sample, Some(TelemetrySample::FlightStatus(FlightStatus::OnGround)));

        let sample = sample_from_notification(&notification(Kind::DisplayMode(41)));
        assert_eq!(sample, Some(TelemetrySample::DisplayMode(DisplayMode::EngineStart)));

        let sample = sample_from_notification(&notification(Kind::Imu(proto::Imu {
            linear_acceleration: Some(proto::Vector3 { x: 0.1, y: 0.2, z: 9.8 }),
            angular_velocity: None,
        })));
        assert_eq!(
            sample,
            Some(TelemetrySample::Imu(ImuSample {
                linear_acceleration: Vector3::new(0.1, 0.2, 9.8),
                angular_velocity: Vector3::zeros(),
            }))
        );
    }

    #[test]
    fn test_empty_notification_is_ignored() {
        assert_eq!(sample_from_notification(&TelemetryNotification { kind: None }), None);
    }

    #[test]
    fn test_quaternion_to_rpy() {
        let identity = quaternion_to_rpy(&proto::Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 })
            .expect("identity");
        assert_eq!(identity, EulerAngles::default());

        // 90 degrees about z
        let half = FRAC_PI_2 / 2.0;
        let yawed = quaternion_to_rpy(&proto::Quaternion {
            x: 0.0,
            y: 0.0,
            z: half.sin(),
            w: half.cos(),
        })
        .expect("yaw");
        assert!(yawed.roll.abs() < 1e-9);
        assert!(yawed.pitch.abs() < 1e-9);
        assert!((yawed.yaw - FRAC_PI_2).abs() < 1e-9);

        // 90 degrees about x
        let rolled = quaternion_to_rpy(&proto::Quaternion {
            x: half.sin(),
            y: 0.0,
            z: 0.0,
            w: half.cos(),
        })
        .expect("roll");
        assert!((rolled.roll - FRAC_PI_2).abs() < 1e-9);
        assert!(rolled.yaw.abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_quaternion_dropped() {
        let zero = proto::Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
        assert_eq!(quaternion_to_rpy(&zero), None);
        assert_eq!(sample_from_notification(&notification(Kind::Attitude(zero))), None);
    }
}
