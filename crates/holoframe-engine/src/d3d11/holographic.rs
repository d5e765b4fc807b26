//! Bindings from the WinRT holographic space and frame to the device traits.

use windows::Graphics::DirectX::Direct3D11::IDirect3DDevice;
use windows::Graphics::Holographic::{
    HolographicCameraPose, HolographicCameraRenderingParameters,
    HolographicFrame as WinHolographicFrame, HolographicFramePresentResult,
    HolographicSpace as WinHolographicSpace,
};

use super::D3D11Backend;
use crate::device::{
    AdapterLuid, BackendError, BackendResult, CameraId, FramePrediction, HolographicFrame,
    HolographicSpace, PresentResult, CODE_NOT_FOUND,
};

impl HolographicSpace<D3D11Backend> for WinHolographicSpace {
    fn primary_adapter_id(&self) -> AdapterLuid {
        match self.PrimaryAdapterId() {
            Ok(id) => AdapterLuid::new(id.LowPart, id.HighPart),
            Err(err) => {
                log::warn!("primary adapter id unavailable: {err}");
                AdapterLuid::NONE
            }
        }
    }

    fn set_direct3d11_device(&self, device: &IDirect3DDevice) -> BackendResult<()> {
        self.SetDirect3D11Device(device)?;
        Ok(())
    }
}

fn camera_poses(frame: &WinHolographicFrame) -> BackendResult<Vec<HolographicCameraPose>> {
    Ok(frame.CurrentPrediction()?.CameraPoses()?.into_iter().collect())
}

impl HolographicFrame<D3D11Backend> for WinHolographicFrame {
    fn current_prediction(&self) -> BackendResult<FramePrediction> {
        let mut ids = Vec::new();
        for pose in camera_poses(self)? {
            ids.push(pose.HolographicCamera()?.Id()?);
        }
        Ok(FramePrediction::new(ids))
    }

    fn rendering_parameters(
        &self,
        camera: CameraId,
    ) -> BackendResult<HolographicCameraRenderingParameters> {
        for pose in camera_poses(self)? {
            if pose.HolographicCamera()?.Id()? == camera {
                return Ok(self.GetRenderingParameters(&pose)?);
            }
        }
        Err(BackendError::new(
            CODE_NOT_FOUND,
            format!("camera {camera} is not in the current prediction"),
        ))
    }

    fn present_using_current_prediction(&self) -> BackendResult<PresentResult> {
        let result = self.PresentUsingCurrentPrediction()?;
        if result == HolographicFramePresentResult::DeviceRemoved {
            Ok(PresentResult::DeviceRemoved)
        } else {
            Ok(PresentResult::Success)
        }
    }
}
