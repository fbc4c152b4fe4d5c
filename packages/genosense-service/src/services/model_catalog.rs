use crate::models::ModelInfo;

/// Models offered by the service. Static until real inference lands.
pub fn model_catalog() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            name: "UNet Multispectral".to_string(),
            model_type: "UNet".to_string(),
            description: "UNet architecture for segmentation of multispectral imagery".to_string(),
            accuracy: 0.89,
            last_updated: "2023-05-15".to_string(),
            active: true,
        },
        ModelInfo {
            name: "ANN Classifier".to_string(),
            model_type: "ANN".to_string(),
            description: "Artificial Neural Network for classification of palm oil infections"
                .to_string(),
            accuracy: 0.92,
            last_updated: "2023-06-10".to_string(),
            active: true,
        },
    ]
}
