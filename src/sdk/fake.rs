//! Scriptable in-memory SDK for unit tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pilot_shared::DroneTask;
use std::sync::Mutex;
use std::time::Duration;

use super::{DroneVersion, FlightSdk};
use crate::command::CommandVector;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SdkCall {
    ControlAuthority(bool),
    TaskControl(DroneTask),
    ArmControl(bool),
    QueryVersion,
    SetLocalPosRef,
}

/// Answers every service with a fixed result and records what was asked
pub(crate) struct FakeSdk {
    pub authority: bool,
    pub takeoff: bool,
    pub land: bool,
    pub go_home: bool,
    pub arm: bool,
    pub local_pos_ref: bool,
    pub publish_fails: bool,
    /// How long the local position reference service takes to answer
    pub origin_delay: Duration,
    pub calls: Mutex<Vec<SdkCall>>,
    pub setpoints: Mutex<Vec<CommandVector>>,
}

impl FakeSdk {
    /// Every service succeeds
    pub fn accepting() -> Self {
        Self {
            authority: true,
            takeoff: true,
            land: true,
            go_home: true,
            arm: true,
            local_pos_ref: true,
            publish_fails: false,
            origin_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            setpoints: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn setpoints(&self) -> Vec<CommandVector> {
        self.setpoints.lock().unwrap().clone()
    }

    fn record(&self, call: SdkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FlightSdk for FakeSdk {
    async fn publish_setpoint(&self, command: CommandVector) -> Result<()> {
        if self.publish_fails {
            return Err(anyhow!("setpoint channel closed"));
        }
        self.setpoints.lock().unwrap().push(command);
        Ok(())
    }

    async fn sdk_control_authority(&self, enable: bool) -> Result<bool> {
        self.record(SdkCall::ControlAuthority(enable));
        Ok(self.authority)
    }

    async fn drone_task_control(&self, task: DroneTask) -> Result<bool> {
        self.record(SdkCall::TaskControl(task));
        Ok(match task {
            DroneTask::Takeoff => self.takeoff,
            DroneTask::Land => self.land,
            DroneTask::GoHome => self.go_home,
        })
    }

    async fn drone_arm_control(&self, arm: bool) -> Result<bool> {
        self.record(SdkCall::ArmControl(arm));
        Ok(self.arm)
    }

    async fn query_drone_version(&self) -> Result<DroneVersion> {
        self.record(SdkCall::QueryVersion);
        Ok(DroneVersion {
            version: 0x0303_0A00,
            hardware: "M100".into(),
        })
    }

    async fn set_local_pos_ref(&self) -> Result<bool> {
        self.record(SdkCall::SetLocalPosRef);
        if !self.origin_delay.is_zero() {
            tokio::time::sleep(self.origin_delay).await;
        }
        Ok(self.local_pos_ref)
    }
}
